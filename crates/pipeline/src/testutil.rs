//! Shared test doubles for the pipeline tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use pipestorm_protocol::{RawMessage, RawValue};

use crate::sink::{SinkClient, SinkError};

/// Sink that records every publish and can fail selected topics
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<(String, Bytes)>>,
    failing_topics: Mutex<Vec<String>>,
    sequence: AtomicU64,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make publishes to `topic` fail until cleared
    pub fn fail_topic(&self, topic: &str) {
        self.failing_topics.lock().push(topic.to_string());
    }

    /// Stop failing any topic
    pub fn clear_failures(&self) {
        self.failing_topics.lock().clear();
    }

    /// All recorded publishes in arrival order
    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.published.lock().clone()
    }

    /// Publishes recorded for one topic, decoded as JSON arrays
    pub fn chunks_for(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| serde_json::from_slice(payload).unwrap())
            .collect()
    }
}

#[async_trait]
impl SinkClient for RecordingSink {
    async fn publish(&self, target_topic: &str, payload: Bytes) -> Result<String, SinkError> {
        if self
            .failing_topics
            .lock()
            .iter()
            .any(|t| t == target_topic)
        {
            return Err(SinkError::publish(target_topic, "injected failure"));
        }

        self.published
            .lock()
            .push((target_topic.to_string(), payload));
        Ok(format!("delivery-{}", self.sequence.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Build a raw message with a text value
pub fn raw_text(topic: &str, partition: i32, offset: i64, value: &str) -> RawMessage {
    RawMessage {
        topic: topic.to_string(),
        partition: Some(partition),
        offset,
        key: None,
        value: Some(RawValue::Text(value.to_string())),
        timestamp: Some(1_700_000_000_000),
    }
}
