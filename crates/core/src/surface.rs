use std::fmt::Display;

use crate::{generator::NotesGenerator, types::StudyNotes};

/// The only failure text a user ever sees; details go to the log.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate study notes. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    /// Last request failed. Submitting again is allowed.
    Failed { message: String },
    Ready(StudyNotes),
}

/// Front-end state shared by the CLI and desktop apps: the entered notes and
/// the lifecycle of the one outstanding request.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    notes: String,
    state: RequestState,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&StudyNotes> {
        match &self.state {
            RequestState::Ready(notes) => Some(notes),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.notes.trim().is_empty()
    }

    /// Enter `Loading` and hand back the text to send, or `None` when
    /// nothing should be sent. Any previous result or error is dropped.
    pub fn begin(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        self.state = RequestState::Loading;
        Some(self.notes.clone())
    }

    pub fn complete<E: Display>(&mut self, outcome: Result<StudyNotes, E>) {
        self.state = match outcome {
            Ok(notes) => RequestState::Ready(notes),
            Err(e) => {
                tracing::error!(error = %e, "study notes generation failed");
                RequestState::Failed {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }
            }
        };
    }

    /// Run one request end to end. Returns `false` if the input was blank or a
    /// request is already in flight, in which case no call is made.
    pub async fn submit(&mut self, generator: &NotesGenerator) -> bool {
        let Some(notes) = self.begin() else {
            return false;
        };
        let outcome = generator.generate(&notes).await;
        self.complete(outcome);
        true
    }
}
