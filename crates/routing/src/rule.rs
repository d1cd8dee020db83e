//! Routing rule and pipe model
//!
//! One rule per source topic; each rule fans out to zero or more pipes.
//! Rules are mutated only through the configuration store - the
//! pipeline treats them as read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

fn default_chunk_size() -> usize {
    1
}

/// One filter + destination + chunking policy within a routing rule
///
/// Pipes are evaluated independently: a single source message may fan
/// out to multiple destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipe {
    /// Destination topic on the sink side
    pub target_topic: String,

    /// Flat mapping of dotted path → expected scalar; empty means
    /// every message passes
    #[serde(default)]
    pub filter: BTreeMap<String, serde_json::Value>,

    /// Upper bound for messages per published chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Whether tombstones (null values) are forwarded
    #[serde(default)]
    pub publish_tombstones: bool,
}

impl Pipe {
    /// Create a pipe with defaults (chunk size 1, no filter)
    pub fn new(target_topic: impl Into<String>) -> Self {
        Self {
            target_topic: target_topic.into(),
            filter: BTreeMap::new(),
            chunk_size: default_chunk_size(),
            publish_tombstones: false,
        }
    }

    /// Validate the pipe's shape and filter spec
    ///
    /// # Errors
    ///
    /// Fails on an empty target topic, chunk size 0, bracket characters
    /// in filter keys, or non-scalar filter values.
    pub fn validate(&self) -> Result<()> {
        if self.target_topic.is_empty() {
            return Err(RoutingError::EmptyTargetTopic);
        }

        if self.chunk_size == 0 {
            return Err(RoutingError::ZeroChunkSize {
                target_topic: self.target_topic.clone(),
            });
        }

        for (key, value) in &self.filter {
            if key.contains('[') || key.contains(']') {
                return Err(RoutingError::BracketInFilterKey { key: key.clone() });
            }
            if value.is_array() || value.is_object() {
                return Err(RoutingError::NonScalarFilterValue { key: key.clone() });
            }
        }

        Ok(())
    }
}

/// Configuration mapping one source topic to its delivery pipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    /// The broker topic this rule applies to (unique per rule)
    pub source_topic: String,

    /// When the rule was created/updated (epoch milliseconds)
    pub created_at: i64,

    /// Whether message values should be JSON-parsed during
    /// normalization
    #[serde(default)]
    pub parse_as_json: bool,

    /// Delivery pipes, each independently evaluated
    #[serde(default)]
    pub pipes: Vec<Pipe>,
}

impl RoutingRule {
    /// Validate the rule and all of its pipes
    pub fn validate(&self) -> Result<()> {
        if self.source_topic.is_empty() {
            return Err(RoutingError::EmptySourceTopic);
        }
        for pipe in &self.pipes {
            pipe.validate()?;
        }
        Ok(())
    }
}
