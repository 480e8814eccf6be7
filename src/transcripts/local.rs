// Local transcript directory
//
// Reads transcripts from a flat directory. Accepted file shapes:
// - `*.json`: an array of events, or an object with a `content` array and
//   optional `issue` / `timestamp` / `status` metadata
// - `*.jsonl`: one event per line (JSON Lines)
//
// JSON Lines files are read leniently: a line that isn't valid JSON becomes an
// `unparsed_line` event, which the interpreter shows verbatim, rather than
// failing the whole transcript.

use super::{validate_filename, Transcript, TranscriptError, TranscriptSummary};
use crate::events::RawEvent;
use crate::interpreter::content::{is_truthy, joined_text, message_blocks};
use crate::util::truncate_chars;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Issue titles taken from the first prompt are cut to this many characters
const ISSUE_PREVIEW_CHARS: usize = 80;

/// Transcripts stored as files in one directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

/// A parsed transcript file with whatever metadata it carried
#[derive(Debug, Default)]
struct TranscriptDocument {
    content: Vec<RawEvent>,
    issue: Option<String>,
    timestamp: Option<String>,
    status: Option<String>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Summaries of all transcripts, newest first
    ///
    /// A missing directory is an empty list. Files that fail to parse are
    /// still listed with fallback metadata.
    pub async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Transcript directory {:?} does not exist", self.dir);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read transcript directory {}", self.dir.display())
                })
            }
        };

        let mut found: Vec<(Option<DateTime<Utc>>, TranscriptSummary)> = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read transcript directory entry")?
        {
            let path = entry.path();
            let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };
            if validate_filename(&filename).is_err() {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

            let document = match read_document(&path, &filename).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Listing unreadable transcript {}: {:#}", filename, e);
                    found.push((modified, fallback_summary(&filename, modified)));
                    continue;
                }
            };

            found.push((modified, summarize(&filename, &document, modified)));
        }

        // Newest first; same mtime falls back to filename, descending
        found.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.filename.cmp(&a.1.filename))
        });

        tracing::debug!("Listed {} transcript(s) in {:?}", found.len(), self.dir);
        Ok(found.into_iter().map(|(_, summary)| summary).collect())
    }

    /// Load one transcript by filename
    pub async fn fetch(&self, filename: &str) -> Result<Transcript> {
        validate_filename(filename)?;
        let path = self.dir.join(filename);

        let document = match read_document(&path, filename).await {
            Ok(document) => document,
            Err(e) if is_not_found(&e) => {
                return Err(TranscriptError::NotFound(filename.to_string()).into())
            }
            Err(e) => return Err(e),
        };

        Ok(Transcript {
            filename: filename.to_string(),
            content: document.content,
        })
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

async fn read_document(path: &Path, filename: &str) -> Result<TranscriptDocument> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    parse_document(filename, &text)
}

fn parse_document(filename: &str, text: &str) -> Result<TranscriptDocument> {
    if filename.ends_with(".jsonl") {
        return Ok(TranscriptDocument {
            content: parse_lines(text),
            ..Default::default()
        });
    }

    let value: Value = serde_json::from_str(text)
        .with_context(|| format!("Transcript {} is not valid JSON", filename))?;

    match value {
        Value::Array(items) => Ok(TranscriptDocument {
            content: items.into_iter().map(RawEvent::new).collect(),
            ..Default::default()
        }),
        Value::Object(mut map) => {
            let Some(Value::Array(items)) = map.remove("content") else {
                bail!("Transcript {} has no content array", filename);
            };
            let text_field = |key: &str| map.get(key).and_then(Value::as_str).map(String::from);
            Ok(TranscriptDocument {
                content: items.into_iter().map(RawEvent::new).collect(),
                issue: text_field("issue"),
                timestamp: text_field("timestamp"),
                status: text_field("status"),
            })
        }
        _ => bail!("Transcript {} is neither an array nor an object", filename),
    }
}

/// Parse JSON Lines, keeping unparseable lines as `unparsed_line` events
fn parse_lines(text: &str) -> Vec<RawEvent> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| match serde_json::from_str::<Value>(line) {
            Ok(value) => RawEvent::new(value),
            Err(e) => {
                tracing::debug!("Line {} is not valid JSON: {}", index + 1, e);
                RawEvent::new(json!({
                    "type": "unparsed_line",
                    "line": index + 1,
                    "text": line,
                }))
            }
        })
        .collect()
}

fn summarize(
    filename: &str,
    document: &TranscriptDocument,
    modified: Option<DateTime<Utc>>,
) -> TranscriptSummary {
    let issue = document
        .issue
        .clone()
        .or_else(|| first_prompt(&document.content))
        .unwrap_or_else(|| file_stem(filename));
    let timestamp = document
        .timestamp
        .clone()
        .unwrap_or_else(|| format_modified(modified));
    let status = document
        .status
        .clone()
        .unwrap_or_else(|| run_status(&document.content).to_string());

    TranscriptSummary {
        filename: filename.to_string(),
        issue,
        timestamp,
        status,
    }
}

fn fallback_summary(filename: &str, modified: Option<DateTime<Utc>>) -> TranscriptSummary {
    TranscriptSummary {
        filename: filename.to_string(),
        issue: file_stem(filename),
        timestamp: format_modified(modified),
        status: "unknown".to_string(),
    }
}

/// First non-empty user text, cut to a title-sized preview
fn first_prompt(events: &[RawEvent]) -> Option<String> {
    events
        .iter()
        .filter(|event| event.type_name() == "user")
        .map(|event| joined_text(&message_blocks(event.get("message"))))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
        .map(|text| {
            let (kept, truncated) = truncate_chars(&text, ISSUE_PREVIEW_CHARS);
            if truncated {
                format!("{}...", kept.trim_end())
            } else {
                kept.to_string()
            }
        })
}

/// Outcome of the last `result` event; `running` when there is none yet
fn run_status(events: &[RawEvent]) -> &'static str {
    match events.iter().rev().find(|e| e.type_name() == "result") {
        Some(result) if is_truthy(result.get("is_error")) => "error",
        Some(_) => "success",
        None => "running",
    }
}

fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn format_modified(modified: Option<DateTime<Utc>>) -> String {
    modified
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
