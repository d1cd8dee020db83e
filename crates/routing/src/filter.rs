//! Filter predicate compilation and evaluation
//!
//! A filter spec is a flat mapping from dotted path to an expected
//! scalar. Compilation splits the paths once; evaluation is the logical
//! AND over per-key equality checks against the parsed message.
//!
//! Paths resolve against the message envelope: `value.*` descends into
//! the JSON payload, while `key`, `partition`, `offset`, `timestamp`
//! and `processedAt` address the envelope fields themselves.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use pipestorm_protocol::{MessageKey, ParsedMessage, Payload};

use crate::error::{Result, RoutingError};

/// A compiled filter predicate
///
/// Pure and side-effect free; compile once per pipe evaluation pass,
/// not per message. An empty filter compiles to an always-true
/// predicate.
#[derive(Debug, Clone)]
pub struct Predicate {
    checks: Vec<(Vec<String>, Value)>,
}

impl Predicate {
    /// Compile a filter spec into a predicate
    ///
    /// # Errors
    ///
    /// Fails fatally on keys containing `[` or `]` (array-index paths
    /// are unsupported) and on expected values that are arrays or
    /// objects (scalars only). These are configuration errors and must
    /// surface before any message is evaluated.
    pub fn compile(filter: &BTreeMap<String, Value>) -> Result<Self> {
        let mut checks = Vec::with_capacity(filter.len());

        for (key, expected) in filter {
            if key.contains('[') || key.contains(']') {
                return Err(RoutingError::BracketInFilterKey { key: key.clone() });
            }
            if expected.is_array() || expected.is_object() {
                return Err(RoutingError::NonScalarFilterValue { key: key.clone() });
            }

            let path: Vec<String> = key.split('.').map(str::to_string).collect();
            checks.push((path, expected.clone()));
        }

        Ok(Self { checks })
    }

    /// Predicate that passes every message
    pub fn always() -> Self {
        Self { checks: Vec::new() }
    }

    /// Whether this predicate passes every message
    pub fn is_always(&self) -> bool {
        self.checks.is_empty()
    }

    /// Evaluate the predicate against one message
    ///
    /// All configured paths must resolve and deep-equal their expected
    /// scalar. A path that does not resolve fails the check.
    pub fn matches(&self, message: &ParsedMessage) -> bool {
        self.checks.iter().all(|(path, expected)| {
            resolve(message, path).map_or(false, |found| found == *expected)
        })
    }
}

/// Resolve a dotted path against the message envelope
///
/// Returns an owned JSON value for comparison, or `None` when the path
/// does not exist on this message.
fn resolve(message: &ParsedMessage, path: &[String]) -> Option<Value> {
    let (head, rest) = path.split_first()?;

    let root = match head.as_str() {
        "value" => return resolve_payload(&message.value, rest),
        "key" => match &message.key {
            Some(MessageKey::Text(s)) => Value::String(s.clone()),
            Some(MessageKey::Bytes(b)) => Value::String(BASE64.encode(b)),
            None => Value::Null,
        },
        "partition" => Value::from(message.partition),
        "offset" => Value::from(message.offset),
        "timestamp" => Value::from(message.timestamp),
        "processedAt" => Value::from(message.processed_at),
        _ => return None,
    };

    // envelope fields other than value are scalars, deeper paths miss
    if rest.is_empty() {
        Some(root)
    } else {
        None
    }
}

fn resolve_payload(payload: &Payload, rest: &[String]) -> Option<Value> {
    match payload {
        Payload::Json(value) => {
            let mut current = value;
            for segment in rest {
                current = current.get(segment)?;
            }
            Some(current.clone())
        }
        Payload::Null if rest.is_empty() => Some(Value::Null),
        // raw bytes have no structure to descend into
        _ => None,
    }
}
