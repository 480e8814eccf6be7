// Interpreter module - turns raw transcript events into renderable messages
//
// Every event maps to exactly one RenderableMessage, in input order. Dispatch
// is by event kind; unrecognized kinds fall through to a verbatim dump of the
// whole event so transcripts from a newer event vocabulary stay viewable.
//
// All externally supplied text is HTML-escaped before it lands in a body,
// whichever handler produced it, including pretty-printed tool inputs.

pub mod clock;
pub mod content;

use crate::events::{DisplayType, EventKind, RawEvent, RenderableMessage};
use crate::util::{escape_html, truncate_chars};
use clock::DisplayZone;
use content::{field_text, is_truthy, joined_text, message_blocks, result_text, ContentBlock};
use serde_json::Value;

/// Tool result content longer than this is cut and marked with an ellipsis
pub const TOOL_RESULT_PREVIEW_CHARS: usize = 500;

const ELLIPSIS: &str = "...";

/// Stateless event interpreter
///
/// Only carries the zone used to display timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter {
    zone: DisplayZone,
}

impl Interpreter {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Interpret a whole transcript: same length, same order, never fails
    pub fn interpret(&self, events: &[RawEvent]) -> Vec<RenderableMessage> {
        events.iter().map(|event| self.interpret_event(event)).collect()
    }

    /// Interpret a single event
    pub fn interpret_event(&self, event: &RawEvent) -> RenderableMessage {
        let kind = event.kind();

        let (display_type, body) = match &kind {
            EventKind::MessageStart => (DisplayType::MessageStart, message_start(event)),
            EventKind::ContentBlockStart => (DisplayType::ContentBlock, content_block_start(event)),
            EventKind::ContentBlockDelta => (DisplayType::ContentDelta, content_block_delta(event)),
            EventKind::Assistant => (DisplayType::Assistant, assistant(event)),
            EventKind::User => user(event),
            EventKind::Result => result(event),
            EventKind::System => (DisplayType::System, system(event)),
            EventKind::Other(name) => (DisplayType::Other(name.clone()), verbatim(event)),
        };

        let timestamp = event
            .get("timestamp")
            .and_then(|raw| self.zone.format_time_of_day(raw));

        RenderableMessage {
            kind: kind.as_str().to_string(),
            display_type,
            timestamp,
            body,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn message_start(event: &RawEvent) -> String {
    let message = event.get("message");
    let role = text_or(message.and_then(|m| m.get("role")), "unknown");
    let model = text_or(message.and_then(|m| m.get("model")), "unknown");
    format!(
        "<strong>🎬 Message Started</strong><br>Role: {}<br>Model: {}",
        role, model
    )
}

fn content_block_start(event: &RawEvent) -> String {
    let block = event.get("content_block");
    match block.and_then(|b| b.get("type")).and_then(Value::as_str) {
        Some("tool_use") => {
            let name = text_or(block.and_then(|b| b.get("name")), "unknown");
            format!(
                "<strong>🔧 Tool Call: {}</strong><br><pre class=\"tool-input\">{}</pre>",
                name,
                pretty_json(block.and_then(|b| b.get("input")))
            )
        }
        _ => format!(
            "<strong>📝 Content Block</strong><br>Type: {}",
            text_or(block.and_then(|b| b.get("type")), "text")
        ),
    }
}

fn content_block_delta(event: &RawEvent) -> String {
    let delta = event.get("delta");
    match delta.and_then(|d| d.get("type")).and_then(Value::as_str) {
        Some("text_delta") => {
            let text = delta
                .and_then(|d| d.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("");
            format!("<span class=\"text-content\">{}</span>", escape_html(text))
        }
        _ => format!(
            "<em>Content delta: {}</em>",
            text_or(delta.and_then(|d| d.get("type")), "unknown")
        ),
    }
}

fn assistant(event: &RawEvent) -> String {
    let blocks = message_blocks(event.get("message"));
    let mut body = escape_html(&joined_text(&blocks));

    for block in &blocks {
        if let ContentBlock::ToolUse { name, input } = block {
            body.push_str(&format!(
                "<br><div class=\"tool-call\"><strong>🔧 {}</strong><pre>{}</pre></div>",
                escape_html(name),
                pretty_json(*input)
            ));
        }
    }
    body
}

fn user(event: &RawEvent) -> (DisplayType, String) {
    let blocks = message_blocks(event.get("message"));
    let mut body = escape_html(&joined_text(&blocks));
    let mut has_tool_result = false;

    for block in &blocks {
        if let ContentBlock::ToolResult {
            tool_use_id,
            content,
        } = block
        {
            has_tool_result = true;
            body.push_str(&format!(
                "<div class=\"tool-result\"><strong>🔧 Tool Result ({}):</strong><br><pre>{}</pre></div>",
                escape_html(tool_use_id),
                tool_result_preview(*content)
            ));
        }
    }

    let display_type = if has_tool_result {
        DisplayType::ToolResult
    } else {
        DisplayType::User
    };
    (display_type, body)
}

fn result(event: &RawEvent) -> (DisplayType, String) {
    if is_truthy(event.get("is_error")) {
        (
            DisplayType::Error,
            "<strong>🏁 Execution Result:</strong> ❌ Error".to_string(),
        )
    } else {
        (
            DisplayType::Success,
            "<strong>🏁 Execution Result:</strong> ✅ Success".to_string(),
        )
    }
}

fn system(event: &RawEvent) -> String {
    let mut body = format!(
        "<strong>⚙️ System:</strong> {}",
        text_or(event.get("subtype"), "Unknown")
    );
    if let Some(model) = field_text(event.get("model")) {
        body.push_str(&format!("<br>Model: {}", escape_html(&model)));
    }
    if let Some(Value::Array(tools)) = event.get("tools") {
        if !tools.is_empty() {
            body.push_str(&format!("<br>Tools: {}", tools.len()));
        }
    }
    body
}

/// Fallback for unrecognized kinds: the whole event, pretty-printed
fn verbatim(event: &RawEvent) -> String {
    format!(
        "<pre class=\"raw-json\">{}</pre>",
        pretty_json(Some(event.as_value()))
    )
}

// ============================================================================
// Field helpers
// ============================================================================

/// Escaped field text, or `default` when the field carries nothing
fn text_or(value: Option<&Value>, default: &str) -> String {
    match field_text(value) {
        Some(text) => escape_html(&text),
        None => default.to_string(),
    }
}

/// Escaped pretty JSON; an absent value renders as `null`
fn pretty_json(value: Option<&Value>) -> String {
    let value = value.unwrap_or(&Value::Null);
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    escape_html(&pretty)
}

/// Tool result content cut to the preview length, escaped, with a trailing
/// ellipsis when anything was cut
fn tool_result_preview(content: Option<&Value>) -> String {
    let text = result_text(content);
    let (kept, truncated) = truncate_chars(&text, TOOL_RESULT_PREVIEW_CHARS);
    let mut preview = escape_html(kept);
    if truncated {
        preview.push_str(ELLIPSIS);
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::unescape_html;
    use serde_json::json;

    fn utc() -> Interpreter {
        Interpreter::new(DisplayZone::Utc)
    }

    fn one(event: Value) -> RenderableMessage {
        utc().interpret_event(&RawEvent::new(event))
    }

    /// Text inside the first `<pre>` of a body, unescaped
    fn pre_text(body: &str) -> String {
        let start = body.find("<pre").expect("body has a <pre>");
        let open_end = start + body[start..].find('>').unwrap() + 1;
        let close = open_end + body[open_end..].find("</pre>").unwrap();
        unescape_html(&body[open_end..close])
    }

    #[test]
    fn test_result_success() {
        let message = one(json!({"type": "result", "is_error": false}));
        assert_eq!(message.kind, "result");
        assert_eq!(message.display_type, DisplayType::Success);
        assert!(message.body.contains("Success"));
    }

    #[test]
    fn test_result_error() {
        let message = one(json!({"type": "result", "is_error": true}));
        assert_eq!(message.display_type, DisplayType::Error);
        assert!(message.body.contains("Error"));
    }

    #[test]
    fn test_result_without_flag_is_success() {
        let message = one(json!({"type": "result", "subtype": "success"}));
        assert_eq!(message.display_type, DisplayType::Success);
    }

    #[test]
    fn test_text_delta_is_escaped() {
        let message = one(json!({
            "type": "content_block_delta",
            "delta": {"type": "text_delta", "text": "<b>hi</b>"}
        }));

        assert_eq!(message.display_type, DisplayType::ContentDelta);
        assert!(!message.body.contains("<b>"));
        assert!(message.body.contains("&lt;b&gt;hi&lt;/b&gt;"));

        let inner = message
            .body
            .strip_prefix("<span class=\"text-content\">")
            .and_then(|rest| rest.strip_suffix("</span>"))
            .unwrap();
        assert_eq!(unescape_html(inner), "<b>hi</b>");
    }

    #[test]
    fn test_non_text_delta_names_its_type() {
        let message = one(json!({
            "type": "content_block_delta",
            "delta": {"type": "input_json_delta", "partial_json": "{\"a\""}
        }));
        assert_eq!(message.body, "<em>Content delta: input_json_delta</em>");

        let missing = one(json!({"type": "content_block_delta"}));
        assert_eq!(missing.body, "<em>Content delta: unknown</em>");
    }

    #[test]
    fn test_unknown_kind_dumps_event() {
        let original = json!({"type": "widget_ping", "value": 42});
        let message = one(original.clone());

        assert_eq!(message.kind, "widget_ping");
        assert_eq!(
            message.display_type,
            DisplayType::Other("widget_ping".to_string())
        );
        assert!(message.body.starts_with("<pre class=\"raw-json\">"));

        let dumped: Value = serde_json::from_str(&pre_text(&message.body)).unwrap();
        assert_eq!(dumped, original);
        assert!(pre_text(&message.body).contains("\n  \"value\": 42"));
    }

    #[test]
    fn test_unknown_kind_with_markup_is_escaped() {
        let original = json!({"type": "<script>", "payload": "</pre><img src=x>"});
        let message = one(original.clone());

        assert_eq!(message.display_type.as_str(), "<script>");
        assert!(!message.body.contains("<img"));
        assert!(!message.body.contains("<script>"));
        let dumped: Value = serde_json::from_str(&pre_text(&message.body)).unwrap();
        assert_eq!(dumped, original);
    }

    #[test]
    fn test_event_without_type_is_unknown() {
        let message = one(json!({"value": 1}));
        assert_eq!(message.kind, "unknown");
        assert_eq!(message.display_type.as_str(), "unknown");
    }

    #[test]
    fn test_non_object_events_fall_back() {
        for event in [json!(42), json!("text"), json!(null), json!([1, 2])] {
            let message = one(event.clone());
            assert_eq!(message.kind, "unknown");
            let dumped: Value = serde_json::from_str(&pre_text(&message.body)).unwrap();
            assert_eq!(dumped, event);
        }
    }

    #[test]
    fn test_message_start_defaults() {
        let full = one(json!({
            "type": "message_start",
            "message": {"role": "assistant", "model": "claude-sonnet-4"}
        }));
        assert_eq!(full.display_type, DisplayType::MessageStart);
        assert!(full.body.contains("Role: assistant"));
        assert!(full.body.contains("Model: claude-sonnet-4"));

        let bare = one(json!({"type": "message_start"}));
        assert!(bare.body.contains("Role: unknown"));
        assert!(bare.body.contains("Model: unknown"));

        let wrong_shape = one(json!({"type": "message_start", "message": "oops"}));
        assert!(wrong_shape.body.contains("Role: unknown"));
    }

    #[test]
    fn test_content_block_start_tool_use() {
        let message = one(json!({
            "type": "content_block_start",
            "content_block": {
                "type": "tool_use",
                "name": "Bash",
                "input": {"command": "echo <hi> && ls"}
            }
        }));

        assert_eq!(message.display_type, DisplayType::ContentBlock);
        assert!(message.body.contains("Tool Call: Bash"));
        assert!(message.body.contains("<pre class=\"tool-input\">"));
        assert!(!message.body.contains("<hi>"));

        let input: Value = serde_json::from_str(&pre_text(&message.body)).unwrap();
        assert_eq!(input, json!({"command": "echo <hi> && ls"}));
    }

    #[test]
    fn test_content_block_start_other_types() {
        let thinking = one(json!({
            "type": "content_block_start",
            "content_block": {"type": "thinking"}
        }));
        assert!(thinking.body.ends_with("Type: thinking"));

        let missing = one(json!({"type": "content_block_start"}));
        assert!(missing.body.ends_with("Type: text"));
    }

    #[test]
    fn test_assistant_text_and_tool_calls() {
        let message = one(json!({
            "type": "assistant",
            "message": {
                "content": [
                    {"type": "text", "text": "Let me check"},
                    {"type": "tool_use", "id": "t1", "name": "Read", "input": {"file_path": "/a<b>"}},
                    {"type": "text", "text": "the file."}
                ]
            }
        }));

        assert_eq!(message.display_type, DisplayType::Assistant);
        assert!(message.body.starts_with("Let me check the file."));
        assert!(message.body.contains("<div class=\"tool-call\"><strong>🔧 Read</strong>"));
        assert!(message.body.contains("/a&lt;b&gt;"));
    }

    #[test]
    fn test_assistant_without_message_is_empty() {
        let message = one(json!({"type": "assistant"}));
        assert_eq!(message.display_type, DisplayType::Assistant);
        assert_eq!(message.body, "");
    }

    #[test]
    fn test_user_text_only() {
        let message = one(json!({
            "type": "user",
            "message": {"role": "user", "content": [{"type": "text", "text": "fix <it>"}]}
        }));
        assert_eq!(message.display_type, DisplayType::User);
        assert_eq!(message.body, "fix &lt;it&gt;");
    }

    #[test]
    fn test_user_tool_result_relabels() {
        let message = one(json!({
            "type": "user",
            "message": {
                "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "done"}
                ]
            }
        }));
        assert_eq!(message.display_type, DisplayType::ToolResult);
        assert!(message.body.contains("Tool Result (toolu_1):"));
        assert_eq!(pre_text(&message.body), "done");
    }

    fn tool_result_with(content: &str) -> RenderableMessage {
        one(json!({
            "type": "user",
            "message": {
                "content": [{"type": "tool_result", "tool_use_id": "t", "content": content}]
            }
        }))
    }

    #[test]
    fn test_tool_result_at_limit_is_kept() {
        let content = "a".repeat(500);
        let message = tool_result_with(&content);
        assert_eq!(pre_text(&message.body), content);
    }

    #[test]
    fn test_tool_result_over_limit_is_truncated() {
        let content = "a".repeat(501);
        let message = tool_result_with(&content);
        assert_eq!(pre_text(&message.body), format!("{}...", "a".repeat(500)));
    }

    #[test]
    fn test_tool_result_truncates_before_escaping() {
        // 500 '<' characters escape to 2000 bytes; the cut happens on the raw text
        let content = "<".repeat(501);
        let message = tool_result_with(&content);
        let shown = pre_text(&message.body);
        assert_eq!(shown, format!("{}...", "<".repeat(500)));
        assert!(!message.body.contains("<<"));
    }

    #[test]
    fn test_tool_result_truncates_on_char_boundary() {
        let content = "é".repeat(600);
        let message = tool_result_with(&content);
        assert_eq!(pre_text(&message.body), format!("{}...", "é".repeat(500)));
    }

    #[test]
    fn test_tool_result_structured_content() {
        let message = one(json!({
            "type": "user",
            "message": {
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "t",
                    "content": [{"type": "text", "text": "<ok>"}]
                }]
            }
        }));
        assert_eq!(
            pre_text(&message.body),
            r#"[{"text":"<ok>","type":"text"}]"#
        );
    }

    #[test]
    fn test_system_fields() {
        let message = one(json!({
            "type": "system",
            "subtype": "init",
            "model": "claude-opus-4",
            "tools": ["Bash", "Read", "Edit"]
        }));
        assert_eq!(message.display_type, DisplayType::System);
        assert!(message
            .body
            .ends_with("System:</strong> init<br>Model: claude-opus-4<br>Tools: 3"));

        let bare = one(json!({"type": "system", "tools": []}));
        assert!(bare.body.ends_with("System:</strong> Unknown"));
    }

    #[test]
    fn test_timestamp_present_only_when_carried() {
        let with = one(json!({"type": "result", "timestamp": "2025-06-01T09:30:15Z"}));
        assert_eq!(with.timestamp.as_deref(), Some("09:30:15"));

        let without = one(json!({"type": "result"}));
        assert_eq!(without.timestamp, None);

        for falsy in [json!(0), json!(false), json!("")] {
            let message = one(json!({"type": "result", "timestamp": falsy}));
            assert_eq!(message.timestamp, None);
        }
    }

    #[test]
    fn test_empty_type_is_unknown() {
        let message = one(json!({"type": "", "x": 1}));
        assert_eq!(message.kind, "unknown");
        assert_eq!(message.display_type.as_str(), "unknown");
    }

    /// Unescaped text between `label` and the next tag in `body`
    fn field_after(body: &str, label: &str) -> String {
        let start = body.find(label).expect("label in body") + label.len();
        let end = start + body[start..].find('<').unwrap_or(body.len() - start);
        unescape_html(&body[start..end])
    }

    #[test]
    fn test_header_fields_are_escaped() {
        let started = one(json!({
            "type": "message_start",
            "message": {"role": "<x>", "model": "<m onload=1>"}
        }));
        assert!(!started.body.contains("<x>"));
        assert_eq!(field_after(&started.body, "Role: "), "<x>");
        assert_eq!(field_after(&started.body, "Model: "), "<m onload=1>");

        let system = one(json!({"type": "system", "subtype": "<s>", "model": "<m>"}));
        assert!(!system.body.contains("<s>"));
        assert!(!system.body.contains("<m>"));
        assert_eq!(field_after(&system.body, "System:</strong> "), "<s>");
        assert_eq!(field_after(&system.body, "Model: "), "<m>");
    }

    #[test]
    fn test_ids_and_block_types_are_escaped() {
        let result = one(json!({
            "type": "user",
            "message": {
                "content": [{"type": "tool_result", "tool_use_id": "<id>", "content": "ok"}]
            }
        }));
        assert!(!result.body.contains("<id>"));
        assert_eq!(field_after(&result.body, "Tool Result ("), "<id>):");

        let block = one(json!({
            "type": "content_block_start",
            "content_block": {"type": "<t>"}
        }));
        assert!(!block.body.contains("<t>"));
        assert_eq!(field_after(&block.body, "Type: "), "<t>");

        let tool = one(json!({
            "type": "content_block_start",
            "content_block": {"type": "tool_use", "name": "<n>", "input": {}}
        }));
        assert!(!tool.body.contains("<n>"));
        assert_eq!(field_after(&tool.body, "Tool Call: "), "<n>");

        let delta = one(json!({
            "type": "content_block_delta",
            "delta": {"type": "<d>"}
        }));
        assert!(!delta.body.contains("<d>"));
        assert_eq!(field_after(&delta.body, "Content delta: "), "<d>");
    }

    #[test]
    fn test_order_and_count_preserved() {
        let events: Vec<RawEvent> = vec![
            json!({"type": "system", "subtype": "init"}),
            json!({"type": "widget_ping", "value": 42}),
            json!({"type": "result", "is_error": true}),
        ]
        .into_iter()
        .map(RawEvent::new)
        .collect();

        let messages = utc().interpret(&events);
        assert_eq!(messages.len(), 3);
        let kinds: Vec<_> = messages.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, ["system", "widget_ping", "result"]);
    }

    #[test]
    fn test_malformed_shapes_never_panic() {
        let events: Vec<RawEvent> = vec![
            json!({"type": "assistant", "message": {"content": [null, 1, {"type": 3}]}}),
            json!({"type": "user", "message": {"content": {"type": "text"}}}),
            json!({"type": "content_block_start", "content_block": []}),
            json!({"type": "content_block_delta", "delta": "text_delta"}),
            json!({"type": "system", "subtype": {"nested": true}, "tools": "all"}),
            json!({"type": "result", "is_error": "yes"}),
            json!(false),
        ]
        .into_iter()
        .map(RawEvent::new)
        .collect();

        let messages = utc().interpret(&events);
        assert_eq!(messages.len(), events.len());
        assert_eq!(messages[5].display_type, DisplayType::Error);
    }

    #[test]
    fn test_empty_transcript() {
        assert!(utc().interpret(&[]).is_empty());
    }
}
