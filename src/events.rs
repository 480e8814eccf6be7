// Event model for transcript viewing
//
// A transcript is an ordered list of loosely-typed JSON events. Each event is
// kept as an untyped JSON value and only classified by its `type`
// discriminator; handlers read whatever fields they need and tolerate the rest.
// The renderable side is a small, fixed record that every event maps onto.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped record from a transcript
///
/// Serializes transparently, so a transcript re-serialized from `RawEvent`s is
/// structurally identical to the file it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `type` discriminator, or "unknown" when missing, empty or not a string
    pub fn type_name(&self) -> &str {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or("unknown")
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_type(self.type_name())
    }

    /// Look up a top-level field. Non-object events have no fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Event kinds the interpreter knows how to render
///
/// Anything else lands in `Other` and is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    MessageStart,
    ContentBlockStart,
    ContentBlockDelta,
    Assistant,
    User,
    Result,
    System,
    Other(String),
}

impl EventKind {
    pub fn from_type(type_name: &str) -> Self {
        match type_name {
            "message_start" => Self::MessageStart,
            "content_block_start" => Self::ContentBlockStart,
            "content_block_delta" => Self::ContentBlockDelta,
            "assistant" => Self::Assistant,
            "user" => Self::User,
            "result" => Self::Result,
            "system" => Self::System,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MessageStart => "message_start",
            Self::ContentBlockStart => "content_block_start",
            Self::ContentBlockDelta => "content_block_delta",
            Self::Assistant => "assistant",
            Self::User => "user",
            Self::Result => "result",
            Self::System => "system",
            Self::Other(name) => name,
        }
    }
}

/// Classification label shown in the message header
///
/// Refines the event kind: `user` events carrying tool results become
/// `tool_result`, `result` events become `success` or `error`.
///
/// The label string is the identity: `Other("success")` and `Success` are
/// the same display type, so equality compares labels.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisplayType {
    MessageStart,
    ContentBlock,
    ContentDelta,
    Assistant,
    User,
    ToolResult,
    Success,
    Error,
    System,
    /// Unrecognized kind, labelled with the kind itself
    Other(String),
}

impl DisplayType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MessageStart => "message_start",
            Self::ContentBlock => "content_block",
            Self::ContentDelta => "content_delta",
            Self::Assistant => "assistant",
            Self::User => "user",
            Self::ToolResult => "tool_result",
            Self::Success => "success",
            Self::Error => "error",
            Self::System => "system",
            Self::Other(label) => label,
        }
    }
}

impl PartialEq for DisplayType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl From<String> for DisplayType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "message_start" => Self::MessageStart,
            "content_block" => Self::ContentBlock,
            "content_delta" => Self::ContentDelta,
            "assistant" => Self::Assistant,
            "user" => Self::User,
            "tool_result" => Self::ToolResult,
            "success" => Self::Success,
            "error" => Self::Error,
            "system" => Self::System,
            _ => Self::Other(label),
        }
    }
}

impl From<DisplayType> for String {
    fn from(display_type: DisplayType) -> Self {
        match display_type {
            DisplayType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-ready projection of one raw event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableMessage {
    /// The original discriminator string
    pub kind: String,
    pub display_type: DisplayType,
    /// Time of day, only when the raw event carried a timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Sanitized HTML fragment
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_discriminator_is_unknown() {
        let event = RawEvent::new(json!({"value": 1}));
        assert_eq!(event.type_name(), "unknown");
        assert_eq!(event.kind(), EventKind::Other("unknown".to_string()));

        let non_object = RawEvent::new(json!(42));
        assert_eq!(non_object.type_name(), "unknown");
        assert!(non_object.get("type").is_none());
    }

    #[test]
    fn test_non_string_discriminator_is_unknown() {
        let event = RawEvent::new(json!({"type": 7}));
        assert_eq!(event.type_name(), "unknown");
    }

    #[test]
    fn test_empty_discriminator_is_unknown() {
        let event = RawEvent::new(json!({"type": "", "x": 1}));
        assert_eq!(event.type_name(), "unknown");
        assert_eq!(event.kind(), EventKind::Other("unknown".to_string()));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for name in [
            "message_start",
            "content_block_start",
            "content_block_delta",
            "assistant",
            "user",
            "result",
            "system",
            "widget_ping",
        ] {
            assert_eq!(EventKind::from_type(name).as_str(), name);
        }
    }

    #[test]
    fn test_renderable_message_serializes_camel_case() {
        let message = RenderableMessage {
            kind: "result".to_string(),
            display_type: DisplayType::Success,
            timestamp: None,
            body: "ok".to_string(),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({"kind": "result", "displayType": "success", "body": "ok"})
        );

        let parsed: RenderableMessage = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_unknown_display_type_keeps_label() {
        let parsed: DisplayType = serde_json::from_value(json!("widget_ping")).unwrap();
        assert_eq!(parsed, DisplayType::Other("widget_ping".to_string()));
        assert_eq!(parsed.to_string(), "widget_ping");
    }

    #[test]
    fn test_display_type_identity_is_its_label() {
        let message = RenderableMessage {
            kind: "tool_result".to_string(),
            display_type: DisplayType::Other("tool_result".to_string()),
            timestamp: None,
            body: String::new(),
        };

        let back: RenderableMessage =
            serde_json::from_value(serde_json::to_value(&message).unwrap()).unwrap();
        assert_eq!(back, message);
        assert_eq!(DisplayType::Other("success".to_string()), DisplayType::Success);
        assert_ne!(DisplayType::Other("widget".to_string()), DisplayType::Error);
    }
}
