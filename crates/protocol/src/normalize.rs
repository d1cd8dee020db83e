//! Message normalization
//!
//! Converts a raw broker message into its canonical `ParsedMessage`
//! form. Malformed messages are dropped (`None`) rather than failing
//! the partition - a drop must never break the ordered sequence.

use bytes::Bytes;

use crate::message::{MessageKey, ParsedMessage, Payload, RawMessage, RawValue};

/// Normalize one raw message
///
/// Returns `None` when the message lacks a topic string or a numeric
/// partition. `now_ms` is the processing time used for `processed_at`
/// and as the timestamp fallback.
///
/// # Value handling
///
/// With `parse_as_json`, the value bytes are UTF-8 decoded and JSON
/// parsed; text that is not valid JSON is kept as a plain string and
/// bytes that are not valid UTF-8 are kept verbatim - malformed JSON
/// never fails normalization. Without `parse_as_json` the value is
/// always stored as raw bytes, serializing structured input to JSON
/// text first.
pub fn normalize(raw: &RawMessage, parse_as_json: bool, now_ms: i64) -> Option<ParsedMessage> {
    if raw.topic.is_empty() {
        return None;
    }
    let partition = raw.partition?;

    let key = raw.key.as_ref().map(|k| normalize_key(k, parse_as_json));
    let value = match &raw.value {
        Some(v) if parse_as_json => parse_value(v),
        Some(v) => Payload::Bytes(v.to_bytes()),
        None => Payload::Null,
    };

    Some(ParsedMessage {
        key,
        value,
        partition,
        offset: raw.offset,
        timestamp: raw.timestamp.unwrap_or(now_ms),
        processed_at: now_ms,
    })
}

// The text decoding is canonical when the rule parses JSON; otherwise
// the raw bytes are kept.
fn normalize_key(key: &RawValue, parse_as_json: bool) -> MessageKey {
    let text = match key {
        RawValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        RawValue::Text(s) => s.clone(),
        RawValue::Json(v) => v.to_string(),
    };

    if parse_as_json {
        MessageKey::Text(text)
    } else {
        MessageKey::Bytes(match key {
            RawValue::Bytes(b) => b.clone(),
            _ => Bytes::from(text.into_bytes()),
        })
    }
}

fn parse_value(value: &RawValue) -> Payload {
    match value {
        RawValue::Json(serde_json::Value::Null) => Payload::Null,
        RawValue::Json(v) => Payload::Json(v.clone()),
        RawValue::Text(s) => parse_text(s),
        RawValue::Bytes(b) => match std::str::from_utf8(b) {
            Ok(text) => parse_text(text),
            // not UTF-8, keep the raw bytes unchanged
            Err(_) => Payload::Bytes(b.clone()),
        },
    }
}

// Happy path turns the text into its JSON structure; anything that does
// not parse is kept as the original string.
fn parse_text(text: &str) -> Payload {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(parsed) => Payload::Json(parsed),
        Err(_) => Payload::Json(serde_json::Value::String(text.to_string())),
    }
}
