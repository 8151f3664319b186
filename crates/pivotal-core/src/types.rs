use serde::{Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// StoryType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    /// Any type this client does not model (e.g. `release`).
    Other,
}

impl StoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryType::Feature => "feature",
            StoryType::Bug => "bug",
            StoryType::Chore => "chore",
            StoryType::Other => "other",
        }
    }

    /// Lenient parse used when reading service documents.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(StoryType::Other)
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for StoryType {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature" => Ok(StoryType::Feature),
            "bug" => Ok(StoryType::Bug),
            "chore" => Ok(StoryType::Chore),
            _ => Err(crate::error::TrackerError::MalformedField {
                field: "story_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// StoryState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryState {
    Unscheduled,
    Unstarted,
    Started,
    Finished,
    Delivered,
    Rejected,
    Accepted,
    /// A state the service reported that this client does not model.
    Unknown,
}

impl StoryState {
    pub fn all() -> &'static [StoryState] {
        &[
            StoryState::Unscheduled,
            StoryState::Unstarted,
            StoryState::Started,
            StoryState::Finished,
            StoryState::Delivered,
            StoryState::Rejected,
            StoryState::Accepted,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoryState::Unscheduled => "unscheduled",
            StoryState::Unstarted => "unstarted",
            StoryState::Started => "started",
            StoryState::Finished => "finished",
            StoryState::Delivered => "delivered",
            StoryState::Rejected => "rejected",
            StoryState::Accepted => "accepted",
            StoryState::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        StoryState::all()
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .unwrap_or(StoryState::Unknown)
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Story size in points.
///
/// The service signals "not estimated" either by omitting the `estimate`
/// element or by sending `-1`. Both read as [`Estimate::Unestimated`], which
/// is written back as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Estimate {
    #[default]
    Unestimated,
    Points(u32),
}

impl Estimate {
    pub const UNSET: i64 = -1;

    pub fn from_raw(raw: Option<i64>) -> Option<Self> {
        match raw {
            None | Some(Self::UNSET) => Some(Estimate::Unestimated),
            Some(n) => u32::try_from(n).ok().map(Estimate::Points),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Estimate::Unestimated => Self::UNSET,
            Estimate::Points(n) => i64::from(n),
        }
    }

    pub fn is_estimated(self) -> bool {
        matches!(self, Estimate::Points(_))
    }

    pub fn points(self) -> Option<u32> {
        match self {
            Estimate::Unestimated => None,
            Estimate::Points(n) => Some(n),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

impl Serialize for Estimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.points() {
            Some(n) => serializer.serialize_some(&n),
            None => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
