//! Sink client boundary
//!
//! The pipeline publishes serialized chunks through this trait and
//! never talks to a concrete pub/sub SDK directly. Implementations own
//! their own timeout and credential handling.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors raised on the sink boundary
#[derive(Debug, Error)]
pub enum SinkError {
    /// A chunk could not be serialized before sending
    #[error("failed to encode chunk for '{target_topic}': {source}")]
    Encode {
        /// Destination topic of the failed chunk
        target_topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// The sink rejected or never acknowledged a publish
    #[error("publish to '{target_topic}' failed: {reason}")]
    Publish {
        /// Destination topic of the failed chunk
        target_topic: String,
        /// Sink-side failure description
        reason: String,
    },
}

impl SinkError {
    /// Create a publish error
    pub fn publish(target_topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Publish {
            target_topic: target_topic.into(),
            reason: reason.into(),
        }
    }
}

/// Acknowledgement for one published chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Destination topic the chunk was published to
    pub target_topic: String,
    /// Sink-assigned identifier for the publish
    pub delivery_id: String,
    /// Number of messages in the chunk
    pub message_count: usize,
}

/// Client for the managed pub/sub sink
///
/// `publish` sends one already-serialized chunk and resolves with the
/// sink's delivery identifier once the sink acknowledged it.
#[async_trait]
pub trait SinkClient: Send + Sync {
    /// Publish one chunk payload to a destination topic
    async fn publish(
        &self,
        target_topic: &str,
        payload: Bytes,
    ) -> std::result::Result<String, SinkError>;
}
