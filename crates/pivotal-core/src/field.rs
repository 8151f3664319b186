//! Typed field extraction from service documents.
//!
//! Every reader looks up the first direct child element named `key`.
//! A missing element is never an error: text fields fall back to an empty
//! string and the other readers report [`Field::Absent`].

use crate::error::{Result, TrackerError};
use roxmltree::Node;

/// Outcome of reading an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Absent,
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }
}

/// First direct child element named `key`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, key: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.has_tag_name(key))
}

/// Direct element children of `node`, skipping whitespace and comments.
pub fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn raw_text(node: Node<'_, '_>, key: &str) -> Option<String> {
    child(node, key).map(|el| {
        el.children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect::<String>()
            .trim()
            .to_string()
    })
}

pub fn text(node: Node<'_, '_>, key: &str) -> String {
    raw_text(node, key).unwrap_or_default()
}

/// Integer field. An element with no text counts as absent; any other
/// non-numeric text is [`TrackerError::MalformedField`].
pub fn int(node: Node<'_, '_>, key: &str) -> Result<Field<i64>> {
    match raw_text(node, key) {
        None => Ok(Field::Absent),
        Some(s) if s.is_empty() => Ok(Field::Absent),
        Some(s) => s
            .parse::<i64>()
            .map(Field::Present)
            .map_err(|_| TrackerError::MalformedField {
                field: key.to_string(),
                value: s,
            }),
    }
}

pub fn boolean(node: Node<'_, '_>, key: &str) -> Field<bool> {
    raw_text(node, key).map(|s| s == "true").into()
}

pub fn array(node: Node<'_, '_>, key: &str) -> Field<Vec<String>> {
    raw_text(node, key)
        .map(|s| {
            if s.is_empty() {
                Vec::new()
            } else {
                s.split(',').map(|part| part.trim().to_string()).collect()
            }
        })
        .into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
