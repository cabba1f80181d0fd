use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{NotesError, Result},
    types::StudyNotes,
};

/// Loosely-typed view of the reply so absent fields can be told apart from
/// wrongly-typed ones.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStudyNotes {
    summary: Option<Value>,
    key_points: Option<Value>,
    exam_questions: Option<Value>,
}

/// Decode the service's text payload into [`StudyNotes`].
///
/// Never substitutes a default: each required field must be present and of
/// the right type.
pub fn decode_study_notes(text: &str) -> Result<StudyNotes> {
    let raw: RawStudyNotes = serde_json::from_str(text)?;

    Ok(StudyNotes {
        summary: string_field("summary", raw.summary)?,
        key_points: string_list_field("keyPoints", raw.key_points)?,
        exam_questions: string_list_field("examQuestions", raw.exam_questions)?,
    })
}

fn string_field(field: &'static str, value: Option<Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(NotesError::MissingField { field }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(NotesError::InvalidField { field }),
    }
}

fn string_list_field(field: &'static str, value: Option<Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Err(NotesError::MissingField { field }),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(NotesError::InvalidField { field }),
            })
            .collect(),
        Some(_) => Err(NotesError::InvalidField { field }),
    }
}
