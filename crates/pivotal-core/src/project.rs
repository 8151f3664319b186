use crate::client::Client;
use crate::error::{Result, TrackerError};
use crate::field;
use crate::story::{NewStory, Story};
use crate::types::{Estimate, StoryType};
use roxmltree::{Document, Node};
use serde::Serialize;

/// Canned filter strings, passed to the service verbatim.
pub mod filters {
    pub const UNSTARTED_FEATURES: &str = "type:feature state:unstarted";
    pub const OPEN_BUGS: &str = "type:bug state:unstarted";
    pub const IN_PROGRESS: &str = "state:started,rejected";
    pub const FINISHED_FEATURES: &str = "state:delivered,finished type:feature";
    pub const FINISHED_BUGS: &str = "state:delivered,finished type:bug";
    pub const KNOWN_ISSUES: &str = "state:unscheduled,unstarted,started,rejected type:bug";
    pub const OPEN_STORIES: &str = "state:unscheduled,unstarted,rejected,started";

    /// Open stories, optionally narrowed to one owner (name or initials).
    pub fn open_stories(owner: Option<&str>) -> String {
        match owner {
            Some(owner) => format!("{OPEN_STORIES} owner:{owner}"),
            None => OPEN_STORIES.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    /// Permitted estimate values, in service order.
    pub point_scale: Vec<String>,
}

impl Project {
    pub fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            project_id: field::text(node, "id"),
            name: field::text(node, "name"),
            point_scale: field::array(node, "point_scale").unwrap_or_default(),
        }
    }

    /// Parse the point the user typed, if the project's scale allows it.
    pub fn point_scale_accepts(&self, input: &str) -> Option<u32> {
        let input = input.trim();
        if self.point_scale.iter().any(|p| p == input) {
            input.parse().ok()
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Project queries
    // -----------------------------------------------------------------------

    /// Every project visible to the token, in service order.
    pub fn all(client: &Client) -> Result<Vec<Project>> {
        let response = client.get(client.projects_url())?.ensure_success()?;
        let doc = Document::parse(&response.body)?;
        Ok(field::elements(doc.root_element())
            .map(Project::from_node)
            .collect())
    }

    pub fn load(client: &Client, project_id: &str) -> Result<Project> {
        let response = client.get(client.project_url(project_id))?;
        if response.is_not_found() {
            return Err(TrackerError::NotFound(format!("project {project_id}")));
        }
        let response = response.ensure_success()?;
        let doc = Document::parse(&response.body)?;
        let mut project = Project::from_node(doc.root_element());
        if project.project_id.is_empty() {
            project.project_id = project_id.to_string();
        }
        Ok(project)
    }

    /// Zero-based position in [`Project::all`].
    pub fn by_index(client: &Client, index: usize) -> Result<Project> {
        Project::all(client)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| TrackerError::NotFound(format!("project at index {}", index + 1)))
    }

    // -----------------------------------------------------------------------
    // Story queries
    // -----------------------------------------------------------------------

    pub fn get_stories(&self, client: &Client, filter: &str) -> Result<Vec<Story>> {
        let url = client.stories_url(&self.project_id, Some(filter));
        let response = client.get(url)?.ensure_success()?;
        let doc = Document::parse(&response.body)?;
        field::elements(doc.root_element())
            .map(|node| Story::from_node(node).map(|story| self.adopt(story)))
            .collect()
    }

    /// `Ok(None)` on 404; any other failure status is an error.
    pub fn load_story(&self, client: &Client, story_id: &str) -> Result<Option<Story>> {
        let response = client.get(client.story_url(&self.project_id, story_id))?;
        if response.is_not_found() {
            return Ok(None);
        }
        let response = response.ensure_success()?;
        let story = Story::from_document(&response.body)?;
        Ok(Some(self.adopt(story)))
    }

    /// POST a new story. Returns the created story when the service echoes it.
    pub fn create_story(&self, client: &Client, new_story: &NewStory) -> Result<Option<Story>> {
        let payload = new_story.to_document()?;
        let url = client.stories_url(&self.project_id, None);
        let response = client.post(url, payload)?.ensure_success()?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let story = Story::from_document(&response.body)?;
        Ok(Some(self.adopt(story)))
    }

    fn adopt(&self, mut story: Story) -> Story {
        if story.project_id.is_empty() {
            story.project_id = self.project_id.clone();
        }
        story
    }

    // -----------------------------------------------------------------------
    // Canned filters
    // -----------------------------------------------------------------------

    /// Open bugs, then unstarted features that have no estimate.
    pub fn unestimated_stories(&self, client: &Client) -> Result<Vec<Story>> {
        let mut stories = self.open_bugs(client)?;
        stories.extend(
            self.get_stories(client, filters::UNSTARTED_FEATURES)?
                .into_iter()
                .filter(|s| s.story_type == StoryType::Feature)
                .filter(|s| s.estimate == Estimate::Unestimated),
        );
        Ok(stories)
    }

    pub fn open_bugs(&self, client: &Client) -> Result<Vec<Story>> {
        self.get_stories(client, filters::OPEN_BUGS)
    }

    pub fn in_progress_stories(&self, client: &Client) -> Result<Vec<Story>> {
        self.get_stories(client, filters::IN_PROGRESS)
    }

    pub fn finished_features(&self, client: &Client) -> Result<Vec<Story>> {
        self.get_stories(client, filters::FINISHED_FEATURES)
    }

    pub fn finished_bugs(&self, client: &Client) -> Result<Vec<Story>> {
        self.get_stories(client, filters::FINISHED_BUGS)
    }

    pub fn known_issues(&self, client: &Client) -> Result<Vec<Story>> {
        self.get_stories(client, filters::KNOWN_ISSUES)
    }

    pub fn open_stories(&self, client: &Client, owner: Option<&str>) -> Result<Vec<Story>> {
        self.get_stories(client, &filters::open_stories(owner))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
