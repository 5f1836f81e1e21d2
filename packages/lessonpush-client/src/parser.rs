//! Narrowing of loosely typed push payloads into [`NotificationEvent`]s.
//!
//! Payloads come straight from the push provider and carry every field as
//! whatever JSON type the sender happened to use. Each field is first coerced
//! to text, then narrowed to its typed form; nothing here can fail loudly.

use lessonpush_core::{NotificationEvent, TargetRole};
use serde_json::{Map, Value};

/// Parses a raw payload. Returns `None` when the payload is not a JSON object.
pub fn parse_payload(payload: &Value) -> Option<NotificationEvent> {
    let fields = payload.as_object()?;

    let kind = text_field(fields, "type")
        .or_else(|| text_field(fields, "kind"))
        .unwrap_or_default();

    Some(NotificationEvent {
        kind,
        route_hint: text_field(fields, "route"),
        target_role: text_field(fields, "targetRole")
            .as_deref()
            .and_then(TargetRole::from_wire),
        lesson_id: text_field(fields, "lessonId")
            .as_deref()
            .and_then(parse_leading_int),
        client_id: text_field(fields, "clientId"),
        open_modal: text_field(fields, "openModal").as_deref() == Some("true"),
        focus_hint: text_field(fields, "focus"),
        highlight_lesson_id: text_field(fields, "highlightLessonId")
            .as_deref()
            .and_then(parse_leading_int),
        role_hint: text_field(fields, "role"),
    })
}

/// Textual form of a field; `null` and missing are the same thing.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

/// Base-10 parse of the leading integer in `text`.
///
/// Leading whitespace and a sign are allowed, trailing garbage is ignored
/// (`"42abc"` is 42, `"7.9"` is 7). No leading digits, or a value outside
/// `i64`, yields `None`.
pub(crate) fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = match trimmed.as_bytes().first() {
        Some(b'-' | b'+') => 1,
        _ => 0,
    };

    let rest = &trimmed[sign_len..];
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    trimmed[..sign_len + digits_end].parse().ok()
}
