//! Pipestorm - Protocol
//!
//! Message model and normalization for the bridge between a partitioned
//! log-based broker and a pub/sub sink.
//!
//! # Design
//!
//! - `RawMessage` is what the broker (or the manual produce endpoint)
//!   delivers: topic, partition, offset and opaque key/value payloads.
//! - `SortedMessageBatch` preserves the broker's delivery order:
//!   topic → partition → ordered message list. The pipeline never
//!   mutates a batch, it only projects it through normalization.
//! - `ParsedMessage` is the canonical per-message form: key decoded,
//!   value optionally JSON-parsed, timestamps resolved. It lives for
//!   exactly one batch-processing pass.
//!
//! Normalization is a pure function - bad messages are dropped
//! (`None`), never propagated as errors. Counting drops is the
//! caller's job.

mod batch;
mod message;
mod normalize;


pub use batch::SortedMessageBatch;
pub use message::{MessageKey, ParsedMessage, Payload, RawMessage, RawValue};
pub use normalize::normalize;

/// Current epoch time in milliseconds
///
/// Used for `processed_at` stamps and timestamp fallbacks.
#[inline]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
