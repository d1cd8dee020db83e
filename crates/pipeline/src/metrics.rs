//! Pipeline counters
//!
//! One shared instance is threaded through the router, publisher and
//! orchestrator; the reporter reads it through the provider trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use pipestorm_metrics::{PipelineMetricsProvider, PipelineSnapshot};

/// Counters for the delivery pipeline
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    messages_processed: AtomicU64,
    messages_success: AtomicU64,
    messages_dropped: AtomicU64,
    batches_routed: AtomicU64,
    batches_failed: AtomicU64,
    missing_rule_failures: AtomicU64,
    chunks_published: AtomicU64,
    publish_failures: AtomicU64,
    batch_retries: AtomicU64,
    last_process_ms: AtomicU64,
    dropped_by_topic: RwLock<HashMap<String, u64>>,
}

impl PipelineMetrics {
    /// Create new metrics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message entering normalization
    #[inline]
    pub fn record_message(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful normalization and its latency
    #[inline]
    pub fn record_message_success(&self, elapsed_ms: u64) {
        self.messages_success.fetch_add(1, Ordering::Relaxed);
        self.last_process_ms.store(elapsed_ms, Ordering::Relaxed);
    }

    /// Record a message dropped during normalization
    pub fn record_dropped(&self, topic: &str) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
        *self
            .dropped_by_topic
            .write()
            .entry(topic.to_string())
            .or_insert(0) += 1;
    }

    /// Record a batch routed to completion
    #[inline]
    pub fn record_batch_routed(&self) {
        self.batches_routed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed route call
    #[inline]
    pub fn record_batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a consumed topic without a routing rule
    #[inline]
    pub fn record_missing_rule(&self) {
        self.missing_rule_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chunk acknowledged by the sink
    #[inline]
    pub fn record_chunk_published(&self) {
        self.chunks_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed chunk publish
    #[inline]
    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a whole-batch retry
    #[inline]
    pub fn record_batch_retry(&self) {
        self.batch_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Per-topic drop counts since startup
    pub fn dropped_by_topic(&self) -> HashMap<String, u64> {
        self.dropped_by_topic.read().clone()
    }

    /// Take a snapshot of current values
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            messages_success: self.messages_success.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            batches_routed: self.batches_routed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            missing_rule_failures: self.missing_rule_failures.load(Ordering::Relaxed),
            chunks_published: self.chunks_published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            batch_retries: self.batch_retries.load(Ordering::Relaxed),
            last_process_ms: self.last_process_ms.load(Ordering::Relaxed),
        }
    }
}

impl PipelineMetricsProvider for PipelineMetrics {
    fn pipeline_snapshot(&self) -> PipelineSnapshot {
        self.snapshot()
    }
}
