//! Lecture Notes Core Library
//!
//! Turns pasted lecture notes into a summary, key points and exam questions
//! by calling an external generative-AI service with a fixed JSON schema.

pub mod config;
pub mod decode;
pub mod error;
pub mod format;
pub mod generator;
pub mod prompt;
pub mod provider;
pub mod service;
pub mod store;
pub mod surface;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used items at crate root
pub use config::Config;
pub use decode::decode_study_notes;
pub use error::{NotesError, Result};
pub use format::format_notes_readable;
pub use generator::NotesGenerator;
pub use provider::{ApiStyle, Provider, ProviderConfig};
pub use service::{GenerationService, HttpGenerationService};
pub use store::{load_notes, save_notes};
pub use surface::{GENERIC_FAILURE_MESSAGE, RequestState, Surface};
pub use types::{EXPECTED_ITEMS, GenerationRequest, ListPolicy, NotesRequest, StudyNotes};
pub use tokio_util::sync::CancellationToken;
