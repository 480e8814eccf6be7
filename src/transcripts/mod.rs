// Transcripts module - where transcripts come from
//
// A transcript is read either from a local directory of JSON / JSON Lines
// files or from another streamview server over HTTP. Both sources hand back
// the same two shapes: summaries for the list view and full transcripts for
// the viewer. Sources are read-only.

pub mod local;
pub mod remote;

use crate::events::RawEvent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use local::LocalStore;
pub use remote::RemoteSource;

/// List-view metadata for one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub filename: String,
    pub issue: String,
    pub timestamp: String,
    pub status: String,
}

/// A full transcript: its name and ordered events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub filename: String,
    pub content: Vec<RawEvent>,
}

impl Transcript {
    /// Pretty-printed content array, as shown in raw mode and exported
    pub fn pretty_content(&self) -> String {
        serde_json::to_string_pretty(&self.content)
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Export body for download
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.content)
            .with_context(|| format!("Failed to serialize transcript {}", self.filename))
    }
}

/// Errors callers may want to tell apart from generic I/O failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// Name would escape the transcript directory or isn't a transcript file
    InvalidName(String),
    NotFound(String),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "Invalid transcript name: {}", name),
            Self::NotFound(name) => write!(f, "Transcript not found: {}", name),
        }
    }
}

impl std::error::Error for TranscriptError {}

/// Check that a filename names a transcript directly inside the source
pub fn validate_filename(filename: &str) -> Result<(), TranscriptError> {
    let invalid = filename.is_empty()
        || filename.contains(['/', '\\', '"'])
        || filename.contains("..")
        || filename.chars().any(char::is_control)
        || !(filename.ends_with(".json") || filename.ends_with(".jsonl"));

    if invalid {
        Err(TranscriptError::InvalidName(filename.to_string()))
    } else {
        Ok(())
    }
}

/// Case-insensitive substring filter over filename, issue and timestamp
///
/// An empty query keeps everything; a query matching nothing yields an empty
/// list.
pub fn filter_summaries(summaries: &[TranscriptSummary], query: &str) -> Vec<TranscriptSummary> {
    let query = query.trim().to_lowercase();
    summaries
        .iter()
        .filter(|summary| {
            query.is_empty()
                || summary.filename.to_lowercase().contains(&query)
                || summary.issue.to_lowercase().contains(&query)
                || summary.timestamp.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Where transcripts are read from
pub enum TranscriptSource {
    Local(LocalStore),
    Remote(RemoteSource),
}

impl TranscriptSource {
    pub async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        match self {
            Self::Local(store) => store.list().await,
            Self::Remote(remote) => remote.list().await,
        }
    }

    pub async fn fetch(&self, filename: &str) -> Result<Transcript> {
        match self {
            Self::Local(store) => store.fetch(filename).await,
            Self::Remote(remote) => remote.fetch(filename).await,
        }
    }

    /// Human-readable origin for log lines
    pub fn describe(&self) -> String {
        match self {
            Self::Local(store) => store.dir().display().to_string(),
            Self::Remote(remote) => remote.base_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(filename: &str, issue: &str, timestamp: &str) -> TranscriptSummary {
        TranscriptSummary {
            filename: filename.to_string(),
            issue: issue.to_string(),
            timestamp: timestamp.to_string(),
            status: "success".to_string(),
        }
    }

    fn summaries() -> Vec<TranscriptSummary> {
        vec![
            summary("issue-12.jsonl", "Fix login redirect", "2025-06-01T10:00:00Z"),
            summary("issue-40.json", "Add CSV export", "2025-06-02T11:00:00Z"),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let found = filter_summaries(&summaries(), "LOGIN");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "issue-12.jsonl");
    }

    #[test]
    fn test_filter_matches_filename_and_timestamp() {
        assert_eq!(filter_summaries(&summaries(), "issue-40")[0].issue, "Add CSV export");
        assert_eq!(filter_summaries(&summaries(), "2025-06-0").len(), 2);
    }

    #[test]
    fn test_filter_without_match_is_empty() {
        assert!(filter_summaries(&summaries(), "kubernetes").is_empty());
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        assert_eq!(filter_summaries(&summaries(), "  "), summaries());
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("run.json").is_ok());
        assert!(validate_filename("run 2.jsonl").is_ok());
        for bad in ["", "../x.json", "a/b.json", "a\\b.json", "notes.txt", "x\".json", "x\n.json"] {
            assert_eq!(
                validate_filename(bad),
                Err(TranscriptError::InvalidName(bad.to_string())),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_export_is_pretty_content() {
        let transcript = Transcript {
            filename: "run.json".to_string(),
            content: vec![RawEvent::new(json!({"type": "result", "is_error": false}))],
        };
        let exported = transcript.export_json().unwrap();
        assert_eq!(
            exported,
            "[\n  {\n    \"is_error\": false,\n    \"type\": \"result\"\n  }\n]"
        );
        assert_eq!(exported, transcript.pretty_content());
    }
}
