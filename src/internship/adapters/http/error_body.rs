//! Extraction of human-readable messages from backend error bodies.

use serde_json::Value;

/// Picks the message to show for a failed request.
///
/// The backend reports failures as `{"error": ...}` or `{"message": ...}`;
/// `error` wins when both are present. Blank or non-string fields are
/// skipped, and anything unparseable falls back to a generic message.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| string_field(value, "error").or_else(|| string_field(value, "message")))
        .map_or_else(|| generic_message(status), str::to_owned)
}

fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn generic_message(status: u16) -> String {
    format!("request failed with status {status}")
}
