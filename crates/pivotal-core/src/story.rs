use crate::client::Client;
use crate::error::{Result, TrackerError};
use crate::field;
use crate::locator;
use crate::types::{Estimate, StoryState, StoryType};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};
use serde::Serialize;

/// Group name for stories that carry no labels.
pub const UNLABELED: &str = "Other";

// ---------------------------------------------------------------------------
// Note / Task / Attachment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: String,
    pub description: String,
    pub url: String,
}

impl Note {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            id: field::text(node, "id"),
            text: field::text(node, "text"),
            author: field::text(node, "author"),
        }
    }
}

impl Task {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            id: field::text(node, "id"),
            description: field::text(node, "description"),
            complete: field::boolean(node, "complete").unwrap_or(false),
        }
    }
}

impl Attachment {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            id: field::text(node, "id"),
            // The service calls an attachment's description its "text".
            description: field::text(node, "text"),
            url: field::text(node, "url"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// The state changes this client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Start,
    Finish,
    Deliver,
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The story must carry an estimate.
    Estimated,
}

impl Guard {
    fn check(self, story: &Story) -> Result<()> {
        match self {
            Guard::Estimated if !story.estimate.is_estimated() => Err(
                TrackerError::InvalidState("Story must be estimated".to_string()),
            ),
            Guard::Estimated => Ok(()),
        }
    }
}

pub struct TransitionRule {
    pub transition: Transition,
    pub target: StoryState,
    pub guard: Option<Guard>,
}

/// Indexed by `Transition as usize`.
pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        transition: Transition::Start,
        target: StoryState::Started,
        guard: Some(Guard::Estimated),
    },
    TransitionRule {
        transition: Transition::Finish,
        target: StoryState::Finished,
        guard: Some(Guard::Estimated),
    },
    TransitionRule {
        transition: Transition::Deliver,
        target: StoryState::Delivered,
        guard: Some(Guard::Estimated),
    },
    TransitionRule {
        transition: Transition::Accept,
        target: StoryState::Accepted,
        guard: None,
    },
    TransitionRule {
        transition: Transition::Reject,
        target: StoryState::Rejected,
        guard: None,
    },
];

impl Transition {
    pub fn all() -> &'static [Transition] {
        &[
            Transition::Start,
            Transition::Finish,
            Transition::Deliver,
            Transition::Accept,
            Transition::Reject,
        ]
    }

    pub fn rule(self) -> &'static TransitionRule {
        &TRANSITIONS[self as usize]
    }

    pub fn target(self) -> StoryState {
        self.rule().target
    }
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub story_id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub owned_by: String,
    pub story_type: StoryType,
    pub state: StoryState,
    pub estimate: Estimate,
    pub url: String,
    pub labels: String,
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub attachments: Vec<Attachment>,
}

impl Story {
    /// Build a story from a `<story>` element. Absent sections parse as
    /// empty; only a malformed estimate fails.
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let raw_estimate = field::int(node, "estimate")?.into_option();
        let estimate =
            Estimate::from_raw(raw_estimate).ok_or_else(|| TrackerError::MalformedField {
                field: "estimate".to_string(),
                value: raw_estimate.map(|n| n.to_string()).unwrap_or_default(),
            })?;

        Ok(Self {
            story_id: field::text(node, "id"),
            project_id: field::text(node, "project_id"),
            name: field::text(node, "name"),
            description: field::text(node, "description"),
            owned_by: field::text(node, "owned_by"),
            story_type: StoryType::parse(&field::text(node, "story_type")),
            state: StoryState::parse(&field::text(node, "current_state")),
            estimate,
            url: field::text(node, "url"),
            labels: field::text(node, "labels"),
            notes: children(node, "notes", Note::from_node),
            tasks: children(node, "tasks", Task::from_node),
            attachments: children(node, "attachments", Attachment::from_node),
        })
    }

    pub fn from_document(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Self::from_node(doc.root_element())
    }

    /// First comma-separated label, or [`UNLABELED`].
    pub fn first_label(&self) -> &str {
        self.labels
            .split(',')
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or(UNLABELED)
    }

    pub fn is_owned(&self) -> bool {
        !self.owned_by.is_empty()
    }

    /// Serialize back into the service's `<story>` shape.
    ///
    /// Fails with [`TrackerError::UnrepresentableText`] when a field holds a
    /// character XML 1.0 cannot carry.
    pub fn to_document(&self) -> Result<String> {
        let mut doc = DocumentWriter::new();
        doc.start("story")?;
        doc.element("id", &self.story_id)?;
        doc.element("project_id", &self.project_id)?;
        doc.element("story_type", self.story_type.as_str())?;
        doc.element("url", &self.url)?;
        doc.element("estimate", &self.estimate.to_string())?;
        doc.element("current_state", self.state.as_str())?;
        doc.element("description", &self.description)?;
        doc.element("name", &self.name)?;
        doc.element("owned_by", &self.owned_by)?;
        doc.element("labels", &self.labels)?;

        doc.start_array("notes")?;
        for note in &self.notes {
            doc.start("note")?;
            doc.element("id", &note.id)?;
            doc.element("text", &note.text)?;
            doc.element("author", &note.author)?;
            doc.end("note")?;
        }
        doc.end("notes")?;

        doc.start_array("tasks")?;
        for task in &self.tasks {
            doc.start("task")?;
            doc.element("id", &task.id)?;
            doc.element("description", &task.description)?;
            doc.element("complete", if task.complete { "true" } else { "false" })?;
            doc.end("task")?;
        }
        doc.end("tasks")?;

        doc.start_array("attachments")?;
        for attachment in &self.attachments {
            doc.start("attachment")?;
            doc.element("id", &attachment.id)?;
            doc.element("text", &attachment.description)?;
            doc.element("url", &attachment.url)?;
            doc.end("attachment")?;
        }
        doc.end("attachments")?;

        doc.end("story")?;
        Ok(doc.finish())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Find a story by id.
    ///
    /// With `project_index` the story is fetched from that project only;
    /// otherwise every project is probed in listing order.
    pub fn find(
        client: &Client,
        story_id: &str,
        project_index: Option<usize>,
    ) -> Result<Option<Story>> {
        Ok(locator::locate_story(client, story_id, project_index)?.map(|(_, story)| story))
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Set the estimate remotely. `self` is left as it was; re-fetch to see
    /// the new value.
    pub fn assign_estimate(&self, client: &Client, estimate: u32) -> Result<()> {
        let url = client.story_estimate_url(&self.project_id, &self.story_id, i64::from(estimate));
        client.put(url)?.ensure_success().map_err(|e| {
            tracing::warn!(story = %self.story_id, error = %e, "estimate rejected");
            e
        })?;
        Ok(())
    }

    /// Check the transition's guard, then request the new state.
    pub fn transition(&self, client: &Client, transition: Transition) -> Result<()> {
        let rule = transition.rule();
        if let Some(guard) = rule.guard {
            guard.check(self)?;
        }
        let url = client.story_state_url(&self.project_id, &self.story_id, rule.target.as_str());
        client.put(url)?.ensure_success().map_err(|e| {
            tracing::warn!(story = %self.story_id, ?transition, error = %e, "state change rejected");
            e
        })?;
        Ok(())
    }

    pub fn start(&self, client: &Client) -> Result<()> {
        self.transition(client, Transition::Start)
    }

    pub fn finish(&self, client: &Client) -> Result<()> {
        self.transition(client, Transition::Finish)
    }

    pub fn deliver(&self, client: &Client) -> Result<()> {
        self.transition(client, Transition::Deliver)
    }

    pub fn accept(&self, client: &Client) -> Result<()> {
        self.transition(client, Transition::Accept)
    }

    pub fn reject(&self, client: &Client) -> Result<()> {
        self.transition(client, Transition::Reject)
    }
}

fn children<'a, 'input: 'a, T>(
    node: Node<'a, 'input>,
    section: &str,
    parse: impl Fn(Node<'a, 'input>) -> T,
) -> Vec<T> {
    field::child(node, section)
        .map(|list| field::elements(list).map(parse).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Document writing
// ---------------------------------------------------------------------------

/// Element-at-a-time writer over `quick_xml::Writer`.
struct DocumentWriter {
    writer: Writer<Vec<u8>>,
}

impl DocumentWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(quick_xml::Error::from)?;
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn start_array(&mut self, name: &str) -> Result<()> {
        let mut start = BytesStart::new(name);
        start.push_attribute(("type", "array"));
        self.write(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn element(&mut self, name: &str, value: &str) -> Result<()> {
        let text = escape_text(name, value)?;
        self.start(name)?;
        self.write(Event::Text(BytesText::from_escaped(text)))?;
        self.end(name)
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }
}

/// Escape element text so it parses back unchanged.
///
/// A literal carriage return would be normalized to a line feed by any
/// conforming parser, so it goes out as a character reference.
fn escape_text(field: &str, value: &str) -> Result<String> {
    if let Some(character) = value.chars().find(|&c| !is_xml_char(c)) {
        return Err(TrackerError::UnrepresentableText {
            field: field.to_string(),
            character,
        });
    }
    Ok(escape(value).replace('\r', "&#13;"))
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

// ---------------------------------------------------------------------------
// NewStory
// ---------------------------------------------------------------------------

/// Fields for creating a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub name: String,
    pub description: Option<String>,
    pub story_type: StoryType,
}

impl NewStory {
    pub fn new(name: impl Into<String>, story_type: StoryType) -> Self {
        Self {
            name: name.into(),
            description: None,
            story_type,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// POST payload: a `<story>` root wrapping the supplied fields.
    pub fn to_document(&self) -> Result<String> {
        let mut doc = DocumentWriter::new();
        doc.start("story")?;
        doc.element("name", &self.name)?;
        if let Some(description) = &self.description {
            doc.element("description", description)?;
        }
        doc.element("story_type", self.story_type.as_str())?;
        doc.end("story")?;
        Ok(doc.finish())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
