use std::path::Path;

use tokio::fs;

use crate::{error::Result, types::StudyNotes};

/// Save study notes as pretty JSON
pub async fn save_notes(notes: &StudyNotes, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(notes)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Load study notes saved by [`save_notes`]
pub async fn load_notes(path: &Path) -> Result<StudyNotes> {
    let json_content = fs::read_to_string(path).await?;
    let notes: StudyNotes = serde_json::from_str(&json_content)?;
    Ok(notes)
}
