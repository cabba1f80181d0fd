use serde_json::{Value, json};

use crate::types::EXPECTED_ITEMS;

/// Build the single user-turn instruction sent with the notes.
pub fn build_prompt(notes: &str) -> String {
    format!(
        "Analyze the following lecture notes and provide:\n\
         1) A short, concise summary.\n\
         2) {n} key points to remember.\n\
         3) {n} exam questions based on the notes.\n\
         \n\
         Lecture Notes:\n\
         {notes}",
        n = EXPECTED_ITEMS
    )
}

/// JSON Schema the service must answer with. All three fields are required.
pub fn study_notes_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A concise summary of the lecture notes."
            },
            "keyPoints": {
                "type": "array",
                "items": { "type": "string" },
                "description": format!("{EXPECTED_ITEMS} key points to remember from the lecture.")
            },
            "examQuestions": {
                "type": "array",
                "items": { "type": "string" },
                "description": format!("{EXPECTED_ITEMS} exam questions based on the lecture notes.")
            }
        },
        "required": ["summary", "keyPoints", "examQuestions"],
        "additionalProperties": false
    })
}
