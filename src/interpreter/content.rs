//! Content blocks inside `message.content`
//!
//! Blocks are read leniently from JSON: a missing or mistyped field falls back
//! to a default instead of rejecting the block.

use serde_json::Value;
use std::borrow::Cow;

/// One entry of a message's content array
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock<'a> {
    Text(&'a str),
    ToolUse {
        name: Cow<'a, str>,
        input: Option<&'a Value>,
    },
    ToolResult {
        tool_use_id: Cow<'a, str>,
        content: Option<&'a Value>,
    },
    /// Thinking, images and anything newer; not extracted
    Other,
}

impl<'a> ContentBlock<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("text") => Self::Text(value.get("text").and_then(Value::as_str).unwrap_or("")),
            Some("tool_use") => Self::ToolUse {
                name: field_text(value.get("name")).unwrap_or(Cow::Borrowed("unknown")),
                input: value.get("input"),
            },
            Some("tool_result") => Self::ToolResult {
                tool_use_id: field_text(value.get("tool_use_id"))
                    .unwrap_or(Cow::Borrowed("unknown")),
                content: value.get("content"),
            },
            _ => Self::Other,
        }
    }
}

/// Blocks of a `message` object
///
/// A plain-string `content` counts as a single text block. Anything else that
/// isn't an array yields no blocks.
pub fn message_blocks(message: Option<&Value>) -> Vec<ContentBlock<'_>> {
    match message.and_then(|m| m.get("content")) {
        Some(Value::Array(items)) => items.iter().map(ContentBlock::from_value).collect(),
        Some(Value::String(text)) => vec![ContentBlock::Text(text)],
        _ => Vec::new(),
    }
}

/// Space-joined text of all text blocks
pub fn joined_text(blocks: &[ContentBlock<'_>]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text(text) => Some(*text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// String form of a tool result's content
///
/// Strings are used as-is, other values as compact JSON, absence as "".
pub fn result_text(content: Option<&Value>) -> Cow<'_, str> {
    match content {
        None => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// Displayable text of a scalar-ish field
///
/// `None` for absent, `null` and empty strings so callers can apply their
/// own default.
pub fn field_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// JavaScript-style truthiness, used for `is_error` flags
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
