//! Find the project that owns a story id.
//!
//! A project index hint is trusted: only that project is asked. Without a
//! hint every project is probed, one request at a time, in listing order,
//! and the first project whose lookup is not a 404 wins.

use crate::client::Client;
use crate::error::Result;
use crate::project::Project;
use crate::story::Story;

/// Owning project of `story_id`, or `None` when no project has it.
///
/// `hint` is a zero-based index into [`Project::all`].
pub fn locate(client: &Client, story_id: &str, hint: Option<usize>) -> Result<Option<Project>> {
    Ok(locate_story(client, story_id, hint)?.map(|(project, _)| project))
}

/// Like [`locate`], also returning the story fetched by the winning probe.
pub fn locate_story(
    client: &Client,
    story_id: &str,
    hint: Option<usize>,
) -> Result<Option<(Project, Story)>> {
    if let Some(index) = hint {
        let project = Project::by_index(client, index)?;
        return Ok(project
            .load_story(client, story_id)?
            .map(|story| (project, story)));
    }

    for project in Project::all(client)? {
        tracing::debug!(story = %story_id, project = %project.project_id, "probing project");
        if let Some(story) = project.load_story(client, story_id)? {
            return Ok(Some((project, story)));
        }
    }
    tracing::debug!(story = %story_id, "no project owns story");
    Ok(None)
}
