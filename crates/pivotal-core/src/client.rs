use crate::config::Config;
use crate::error::Result;
use crate::transport::{HttpTransport, Method, Request, Response, Transport};

/// Service endpoints bound to a [`Transport`].
///
/// Every call is a single blocking request. Responses come back with their
/// status untouched; callers decide what a non-2xx status means.
pub struct Client {
    transport: Box<dyn Transport>,
    base_url: String,
}

impl Client {
    pub fn new(transport: impl Transport + 'static, base_url: impl Into<String>) -> Self {
        Self {
            transport: Box::new(transport),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(transport, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    pub fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}", self.base_url, project_id)
    }

    /// The filter is passed through verbatim, percent-encoded.
    pub fn stories_url(&self, project_id: &str, filter: Option<&str>) -> String {
        let base = format!("{}/stories", self.project_url(project_id));
        match filter {
            Some(f) => format!("{}?filter={}", base, urlencoding::encode(f)),
            None => base,
        }
    }

    pub fn story_url(&self, project_id: &str, story_id: &str) -> String {
        format!("{}/{}", self.stories_url(project_id, None), story_id)
    }

    pub fn story_estimate_url(&self, project_id: &str, story_id: &str, estimate: i64) -> String {
        format!(
            "{}?story[estimate]={}",
            self.story_url(project_id, story_id),
            estimate
        )
    }

    pub fn story_state_url(&self, project_id: &str, story_id: &str, state: &str) -> String {
        format!(
            "{}?story[current_state]={}",
            self.story_url(project_id, story_id),
            urlencoding::encode(state)
        )
    }

    // -----------------------------------------------------------------------
    // Verbs
    // -----------------------------------------------------------------------

    pub fn get(&self, url: String) -> Result<Response> {
        self.transport.send(Request {
            method: Method::Get,
            url,
            body: None,
        })
    }

    pub fn put(&self, url: String) -> Result<Response> {
        self.transport.send(Request {
            method: Method::Put,
            url,
            body: None,
        })
    }

    pub fn post(&self, url: String, body: String) -> Result<Response> {
        self.transport.send(Request {
            method: Method::Post,
            url,
            body: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn client() -> Client {
        Client::new(MockTransport::new(), "http://tracker.test/services/v3/")
    }

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(client().base_url(), "http://tracker.test/services/v3");
    }

    #[test]
    fn filter_is_percent_encoded() {
        let url = client().stories_url("7", Some("state:started,rejected owner:AL"));
        assert_eq!(
            url,
            "http://tracker.test/services/v3/projects/7/stories?filter=state%3Astarted%2Crejected%20owner%3AAL"
        );
    }

    #[test]
    fn mutation_urls() {
        let c = client();
        assert_eq!(
            c.story_estimate_url("7", "42", 3),
            "http://tracker.test/services/v3/projects/7/stories/42?story[estimate]=3"
        );
        assert_eq!(
            c.story_state_url("7", "42", "accepted"),
            "http://tracker.test/services/v3/projects/7/stories/42?story[current_state]=accepted"
        );
    }
}
