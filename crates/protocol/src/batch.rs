//! Sorted message batches
//!
//! The broker client delivers consumed messages pre-sorted by topic and
//! partition, with each partition's messages in log order. That nesting
//! is the ordering contract the whole pipeline is built around.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::message::RawMessage;

/// An ordered batch of consumed messages: topic → partition → messages
///
/// Within one partition the message sequence is the broker's log order
/// and must be processed sequentially. Across topics and partitions
/// there is no ordering guarantee.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SortedMessageBatch {
    partitions: BTreeMap<String, BTreeMap<i32, Vec<RawMessage>>>,
}

impl SortedMessageBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under its topic and partition, preserving order
    pub fn push(&mut self, topic: impl Into<String>, partition: i32, message: RawMessage) {
        self.partitions
            .entry(topic.into())
            .or_default()
            .entry(partition)
            .or_default()
            .push(message);
    }

    /// Iterate topics with their partition maps
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<i32, Vec<RawMessage>>)> {
        self.partitions.iter()
    }

    /// Topic names present in this batch
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.partitions.keys().map(String::as_str)
    }

    /// Number of topics in the batch
    pub fn topic_count(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of messages across all topics and partitions
    pub fn message_count(&self) -> usize {
        self.partitions
            .values()
            .flat_map(|partitions| partitions.values())
            .map(Vec::len)
            .sum()
    }

    /// Whether the batch contains no messages at all
    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }
}
