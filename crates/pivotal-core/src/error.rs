use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("service rejected request ({status}): {body}")]
    ServiceRejected { status: u16, body: String },

    #[error("malformed field '{field}': {value:?}")]
    MalformedField { field: String, value: String },

    #[error("field '{field}' contains {character:?}, which XML cannot represent")]
    UnrepresentableText { field: String, character: char },

    #[error("transport error: {0}")]
    Transport(String),

    #[error(
        "PIVOTAL_TOKEN is not set\n\n  \
         Export your Pivotal developer token before running:\n    \
         export PIVOTAL_TOKEN='your token'\n\n  \
         The token is listed at the bottom of your Pivotal profile page."
    )]
    MissingToken,

    #[error("invalid document: {0}")]
    Document(#[from] roxmltree::Error),

    #[error("could not write document: {0}")]
    Encode(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl TrackerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
