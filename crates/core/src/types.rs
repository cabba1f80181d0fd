use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::NotesError;

/// Number of key points and exam questions the prompt asks for.
pub const EXPECTED_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyNotes {
    pub summary: String,
    pub key_points: Vec<String>,
    pub exam_questions: Vec<String>,
}

/// Provider-independent request handed to a [`GenerationService`].
///
/// [`GenerationService`]: crate::service::GenerationService
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub schema: serde_json::Value,
}

/// A single generation call as seen by the caller.
///
/// `timeout` overrides the generator default; `cancel` lets the caller abort
/// an in-flight request.
#[derive(Debug, Clone, Default)]
pub struct NotesRequest {
    pub notes: String,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl NotesRequest {
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// What to do when the service returns more or fewer than
/// [`EXPECTED_ITEMS`] key points or exam questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListPolicy {
    #[default]
    AsReturned,
    /// Keep at most `EXPECTED_ITEMS`; shorter lists pass through.
    Truncate,
    /// Anything other than exactly `EXPECTED_ITEMS` is an error.
    Strict,
}

impl ListPolicy {
    pub fn apply(self, mut notes: StudyNotes) -> Result<StudyNotes, NotesError> {
        match self {
            ListPolicy::AsReturned => Ok(notes),
            ListPolicy::Truncate => {
                notes.key_points.truncate(EXPECTED_ITEMS);
                notes.exam_questions.truncate(EXPECTED_ITEMS);
                Ok(notes)
            }
            ListPolicy::Strict => {
                for (field, list) in [
                    ("keyPoints", &notes.key_points),
                    ("examQuestions", &notes.exam_questions),
                ] {
                    if list.len() != EXPECTED_ITEMS {
                        return Err(NotesError::ListLength {
                            field,
                            expected: EXPECTED_ITEMS,
                            actual: list.len(),
                        });
                    }
                }
                Ok(notes)
            }
        }
    }
}

impl FromStr for ListPolicy {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "as-returned" | "as_returned" | "none" => Ok(ListPolicy::AsReturned),
            "truncate" => Ok(ListPolicy::Truncate),
            "strict" => Ok(ListPolicy::Strict),
            other => Err(NotesError::InvalidConfig {
                reason: format!("unknown list policy `{other}`"),
            }),
        }
    }
}
