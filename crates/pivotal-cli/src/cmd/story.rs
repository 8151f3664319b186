use crate::output::print_json;
use anyhow::Context;
use clap::ValueEnum;
use pivotal_core::report::{estimate_bar, initials};
use pivotal_core::types::StoryType;
use pivotal_core::{Client, NewStory, Story, TrackerError, Transition};

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoryKind {
    Feature,
    Bug,
    Chore,
}

impl From<StoryKind> for StoryType {
    fn from(kind: StoryKind) -> Self {
        match kind {
            StoryKind::Feature => StoryType::Feature,
            StoryKind::Bug => StoryType::Bug,
            StoryKind::Chore => StoryType::Chore,
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

pub fn list(
    client: &Client,
    index: Option<usize>,
    owner: Option<&str>,
    number: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let project = super::project::pick(client, index)?;
    let stories = project
        .open_stories(client, owner)
        .context("failed to load stories")?;
    let limit = number.unwrap_or(DEFAULT_LIMIT);
    let top: Vec<&Story> = stories.iter().take(limit).collect();

    if json {
        return print_json(&top);
    }

    if number.is_none() {
        println!();
        println!(
            "Showing the top {DEFAULT_LIMIT} stories, if you want to show more, specify number with the --number option"
        );
        println!();
    }

    if top.is_empty() {
        println!("None");
    }
    for story in top {
        println!("{}", story_row(story));
    }
    Ok(())
}

/// One line per story: id, owner initials, type, state, estimate, name.
pub fn story_row(story: &Story) -> String {
    format!(
        "{:<14}{:<4}{:<9}{:<13}{:<10} {}",
        format!("#{}", story.story_id),
        initials(&story.owned_by),
        story.story_type,
        story.state,
        estimate_bar(story.estimate),
        story.name
    )
}

// ---------------------------------------------------------------------------
// Single story
// ---------------------------------------------------------------------------

/// `None` after telling the user, when no project has the story.
fn load(client: &Client, story_id: &str, index: Option<usize>) -> anyhow::Result<Option<Story>> {
    let story = Story::find(client, story_id, index)
        .with_context(|| format!("failed to look up story #{story_id}"))?;
    if story.is_none() {
        println!("Could not find story #{story_id}");
    }
    Ok(story)
}

pub fn show(client: &Client, story_id: &str, index: Option<usize>, json: bool) -> anyhow::Result<()> {
    let Some(story) = load(client, story_id, index)? else {
        return Ok(());
    };

    if json {
        return print_json(&story);
    }

    println!();
    println!(
        "{:<12}{:<4}{:<9}{:<10} {}",
        format!("#{}", story.story_id),
        initials(&story.owned_by),
        story.story_type,
        estimate_bar(story.estimate),
        story.name
    );
    println!();
    println!("Story Url: {}", story.url);
    println!("Description: {}", story.description);
    print_details(&story);
    println!();
    Ok(())
}

/// Notes, tasks and attachments; shared with the poker screen.
pub fn print_details(story: &Story) {
    if !story.notes.is_empty() {
        println!();
        println!("Notes:");
        for note in &story.notes {
            println!("[{}] {}", initials(&note.author), note.text);
        }
    }

    if !story.tasks.is_empty() {
        println!();
        println!("Tasks:");
        for task in &story.tasks {
            println!("[{}] {}", if task.complete { "X" } else { " " }, task.description);
        }
    }

    if !story.attachments.is_empty() {
        println!();
        println!("Attachments:");
        for attachment in &story.attachments {
            if attachment.description.is_empty() {
                println!("{}", attachment.url);
            } else {
                println!("{} {}", attachment.description, attachment.url);
            }
        }
    }
}

pub fn open(client: &Client, story_id: &str, index: Option<usize>) -> anyhow::Result<()> {
    let Some(story) = load(client, story_id, index)? else {
        return Ok(());
    };
    open::that(&story.url).with_context(|| format!("failed to open {}", story.url))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

pub fn create(
    client: &Client,
    index: Option<usize>,
    kind: StoryKind,
    title: &str,
    description: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let project = super::project::pick(client, index)?;
    let mut new_story = NewStory::new(title, kind.into());
    if let Some(d) = description {
        new_story = new_story.with_description(d);
    }
    let created = project
        .create_story(client, &new_story)
        .with_context(|| format!("failed to create story in '{}'", project.name))?;

    if json {
        return print_json(&created);
    }
    match created {
        Some(story) => println!("Created {} #{}: {}", story.story_type, story.story_id, story.name),
        None => println!("Created {}: {}", new_story.story_type, new_story.name),
    }
    Ok(())
}

pub fn transition(
    client: &Client,
    story_id: &str,
    index: Option<usize>,
    transition: Transition,
    json: bool,
) -> anyhow::Result<()> {
    let Some(story) = load(client, story_id, index)? else {
        return Ok(());
    };

    match story.transition(client, transition) {
        Ok(()) => {}
        // Local guard: nothing was sent, report and carry on.
        Err(TrackerError::InvalidState(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(e) => {
            return Err(anyhow::Error::from(e).context(format!("failed to update story #{story_id}")));
        }
    }

    let state = transition.target();
    if json {
        print_json(&serde_json::json!({
            "story_id": story.story_id,
            "state": state,
        }))?;
    } else {
        println!(
            "Story: [{}] {} is {}",
            story.story_id,
            story.name,
            state.as_str().to_uppercase()
        );
    }
    Ok(())
}
