use crate::error::{Result, TrackerError};
use crate::transport::{Method, Request, Response, Transport};
use std::cell::RefCell;
use std::rc::Rc;

pub const BASE_URL: &str = "http://tracker.test";

/// In-memory transport that answers from a fixed route table and records
/// every request it sees. Unrouted requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<(Method, String, Response)>,
    log: Rc<RefCell<Vec<Request>>>,
    offline: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails as if the host were unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// `path` is appended to [`BASE_URL`].
    pub fn route(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .push((method, format!("{BASE_URL}{path}"), Response::new(status, body)));
        self
    }

    pub fn log(&self) -> Rc<RefCell<Vec<Request>>> {
        Rc::clone(&self.log)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> Result<Response> {
        self.log.borrow_mut().push(request.clone());
        if self.offline {
            return Err(TrackerError::Transport("connection refused".to_string()));
        }
        let response = self
            .routes
            .iter()
            .find(|(method, url, _)| *method == request.method && *url == request.url)
            .map(|(_, _, resp)| resp.clone())
            .unwrap_or_else(|| Response::new(404, "<message>Resource not found</message>"));
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Document fixtures
// ---------------------------------------------------------------------------

pub fn project_xml(id: &str, name: &str) -> String {
    format!(
        "<project><id>{id}</id><name>{name}</name><point_scale>0,1,2,3</point_scale></project>"
    )
}

pub fn projects_xml(projects: &[(&str, &str)]) -> String {
    let inner: String = projects
        .iter()
        .map(|(id, name)| project_xml(id, name))
        .collect();
    format!(r#"<projects type="array">{inner}</projects>"#)
}

pub fn story_xml(id: &str, story_type: &str, state: &str, estimate: Option<i64>) -> String {
    let estimate = estimate
        .map(|e| format!(r#"<estimate type="integer">{e}</estimate>"#))
        .unwrap_or_default();
    format!(
        "<story><id>{id}</id><project_id>1</project_id><story_type>{story_type}</story_type>\
         <current_state>{state}</current_state>{estimate}<name>Story {id}</name></story>"
    )
}

pub fn stories_xml(stories: &[String]) -> String {
    format!(r#"<stories type="array">{}</stories>"#, stories.concat())
}
