use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::{fs, io::AsyncReadExt};

/// Where the lecture notes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesSource {
    Text(String),
    File(PathBuf),
    Stdin,
}

impl NotesSource {
    /// `--text` wins over a file argument; `-` or nothing means stdin.
    pub fn from_args(text: Option<String>, file: Option<PathBuf>) -> Self {
        match (text, file) {
            (Some(text), _) => NotesSource::Text(text),
            (None, Some(path)) if path != Path::new("-") => NotesSource::File(path),
            _ => NotesSource::Stdin,
        }
    }

    pub async fn read(self) -> Result<String> {
        match self {
            NotesSource::Text(text) => Ok(text),
            NotesSource::File(path) => {
                let notes = fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read notes from {}", path.display()))?;
                tracing::debug!(path = %path.display(), bytes = notes.len(), "read notes from file");
                Ok(notes)
            }
            NotesSource::Stdin => {
                let mut notes = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut notes)
                    .await
                    .context("failed to read notes from stdin")?;
                tracing::debug!(bytes = notes.len(), "read notes from stdin");
                Ok(notes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_flag_takes_precedence() {
        let source = NotesSource::from_args(Some("inline".into()), Some("notes.md".into()));
        assert_eq!(source, NotesSource::Text("inline".into()));
    }

    #[test]
    fn dash_and_nothing_mean_stdin() {
        assert_eq!(NotesSource::from_args(None, None), NotesSource::Stdin);
        assert_eq!(
            NotesSource::from_args(None, Some("-".into())),
            NotesSource::Stdin
        );
    }

    #[tokio::test]
    async fn reads_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.txt");
        std::fs::write(&path, "  Osmosis\n- water moves\n").unwrap();

        let notes = NotesSource::File(path).read().await.unwrap();
        assert_eq!(notes, "  Osmosis\n- water moves\n");
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = NotesSource::File("/definitely/not/here.txt".into())
            .read()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
