//! Data behind the changelog, scrum and story listings.

use crate::client::Client;
use crate::error::Result;
use crate::project::Project;
use crate::story::Story;
use crate::types::Estimate;
use serde::Serialize;

pub const ESTIMATE_BAR_WIDTH: usize = 8;

/// Stories sharing a key, in first-appearance order.
#[derive(Debug, Clone, Serialize)]
pub struct StoryGroup {
    pub key: String,
    pub stories: Vec<Story>,
}

fn group_by(stories: Vec<Story>, key: impl Fn(&Story) -> Option<String>) -> Vec<StoryGroup> {
    let mut groups: Vec<StoryGroup> = Vec::new();
    for story in stories {
        let Some(k) = key(&story) else { continue };
        match groups.iter_mut().find(|g| g.key == k) {
            Some(group) => group.stories.push(story),
            None => groups.push(StoryGroup {
                key: k,
                stories: vec![story],
            }),
        }
    }
    groups
}

/// Unowned stories are left out.
pub fn group_by_owner(stories: Vec<Story>) -> Vec<StoryGroup> {
    group_by(stories, |s| s.is_owned().then(|| s.owned_by.clone()))
}

pub fn group_by_label(stories: Vec<Story>) -> Vec<StoryGroup> {
    group_by(stories, |s| Some(s.first_label().to_string()))
}

/// "Ann Lee" -> "AL".
pub fn initials(full_name: &str) -> String {
    full_name
        .split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// `[***     ]` for three points; blank when unestimated.
pub fn estimate_bar(estimate: Estimate) -> String {
    let stars = "*".repeat(estimate.points().unwrap_or(0) as usize);
    format!("[{stars:<width$}]", width = ESTIMATE_BAR_WIDTH)
}

// ---------------------------------------------------------------------------
// Changelog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Changelog {
    pub project: String,
    pub new_features: Vec<StoryGroup>,
    pub bugs_fixed: Vec<Story>,
    pub known_issues: Vec<Story>,
}

impl Changelog {
    /// Three requests: finished features, finished bugs, known issues.
    pub fn build(client: &Client, project: &Project) -> Result<Self> {
        Ok(Self {
            project: project.name.clone(),
            new_features: group_by_label(project.finished_features(client)?),
            bugs_fixed: project.finished_bugs(client)?,
            known_issues: project.known_issues(client)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Scrum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Scrum {
    pub project: String,
    pub by_owner: Vec<StoryGroup>,
    pub bugs: Vec<Story>,
}

impl Scrum {
    pub fn build(client: &Client, project: &Project) -> Result<Self> {
        Ok(Self {
            project: project.name.clone(),
            by_owner: group_by_owner(project.in_progress_stories(client)?),
            bugs: project.open_bugs(client)?,
        })
    }
}
