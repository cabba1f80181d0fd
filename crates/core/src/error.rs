use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Generation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Empty response from generation service")]
    EmptyResponse,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Malformed response: field `{field}` has the wrong type")]
    InvalidField { field: &'static str },

    #[error("Expected {expected} items in `{field}`, got {actual}")]
    ListLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NotesError>;
