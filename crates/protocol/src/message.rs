//! Raw and parsed message types
//!
//! `RawMessage` mirrors what the broker client hands over. `ParsedMessage`
//! is the canonical form produced by normalization and is what filters
//! evaluate against and what chunks serialize.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// An opaque key or value payload as delivered by a collaborator
///
/// The broker delivers `Bytes`; the manual produce endpoint delivers
/// `Text` or already-structured `Json`. Normalization flattens the
/// distinction.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Raw bytes straight from the broker
    Bytes(Bytes),
    /// A text payload (manual produce, string-keyed records)
    Text(String),
    /// An already-parsed JSON payload (manual produce)
    Json(serde_json::Value),
}

impl RawValue {
    /// Payload as bytes, serializing structured input to JSON text first
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Bytes(b) => b.clone(),
            Self::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
            Self::Json(v) => Bytes::from(v.to_string().into_bytes()),
        }
    }
}

// JSON strings become Text, everything else stays structured. Bytes
// only ever enter through the broker client, not through JSON bodies.
impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        })
    }
}

/// A single message as delivered by the broker client
///
/// Optional fields reflect the wire reality: keys and values may be
/// absent (tombstones), partitions may be missing on malformed input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Source topic name
    pub topic: String,

    /// Partition the message was read from
    pub partition: Option<i32>,

    /// Offset within the partition
    #[serde(default)]
    pub offset: i64,

    /// Record key, if any
    #[serde(default)]
    pub key: Option<RawValue>,

    /// Record value; `None` is a tombstone
    #[serde(default)]
    pub value: Option<RawValue>,

    /// Source-supplied timestamp (epoch milliseconds)
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Canonical key form after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKey {
    /// UTF-8 decoded key (canonical when the rule parses JSON)
    Text(String),
    /// Raw key bytes
    Bytes(Bytes),
}

impl Serialize for MessageKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&BASE64.encode(b)),
        }
    }
}

/// Canonical value form after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON structure (rule has `parseAsJson`)
    Json(serde_json::Value),
    /// Raw bytes, kept verbatim
    Bytes(Bytes),
    /// Absent value (tombstone)
    Null,
}

impl Payload {
    /// Whether this payload signals deletion of the keyed record
    ///
    /// Tombstones are absent values, JSON `null`, or the literal text
    /// `"null"`.
    pub fn is_tombstone(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Json(serde_json::Value::Null) => true,
            Self::Json(serde_json::Value::String(s)) => s == "null",
            _ => false,
        }
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Json(v) => v.serialize(serializer),
            Self::Bytes(b) => serializer.serialize_str(&BASE64.encode(b)),
            Self::Null => serializer.serialize_none(),
        }
    }
}

/// A message after normalization
///
/// Immutable once created; exists only for the duration of one
/// batch-processing pass. Serializes with camelCase field names, which
/// is also the path vocabulary the filter engine resolves against.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage {
    /// Canonical key, if the raw message had one
    pub key: Option<MessageKey>,

    /// Canonical value
    pub value: Payload,

    /// Partition the message was read from
    pub partition: i32,

    /// Offset within the partition
    pub offset: i64,

    /// Source timestamp, or processing time when the source had none
    pub timestamp: i64,

    /// Processing time (epoch milliseconds at normalization)
    pub processed_at: i64,
}

impl ParsedMessage {
    /// Whether this message is a tombstone
    #[inline]
    pub fn is_tombstone(&self) -> bool {
        self.value.is_tombstone()
    }
}

impl Serialize for ParsedMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("ParsedMessage", 6)?;
        s.serialize_field("key", &self.key)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("partition", &self.partition)?;
        s.serialize_field("offset", &self.offset)?;
        s.serialize_field("timestamp", &self.timestamp)?;
        s.serialize_field("processedAt", &self.processed_at)?;
        s.end()
    }
}
