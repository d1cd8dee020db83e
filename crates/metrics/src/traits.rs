//! Metrics provider traits and shared counter structs
//!
//! All counters use relaxed ordering; snapshots may be slightly stale
//! when read, which is fine for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the routing-table poller
///
/// Owned by the poller, read by the reporter.
#[derive(Debug, Default)]
pub struct PollerMetrics {
    /// Poll ticks started
    polls: AtomicU64,
    /// Poll ticks that applied a rule set
    polls_success: AtomicU64,
    /// Poll ticks that failed to reach the store
    polls_failed: AtomicU64,
    /// Times the topic-set fingerprint changed
    topic_changes: AtomicU64,
    /// Rules seen in the most recent successful poll (gauge)
    configured_topics: AtomicU64,
}

impl PollerMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            polls: AtomicU64::new(0),
            polls_success: AtomicU64::new(0),
            polls_failed: AtomicU64::new(0),
            topic_changes: AtomicU64::new(0),
            configured_topics: AtomicU64::new(0),
        }
    }

    /// Record a poll tick starting
    #[inline]
    pub fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful poll and the rule count it observed
    #[inline]
    pub fn record_poll_success(&self, configured_topics: u64) {
        self.polls_success.fetch_add(1, Ordering::Relaxed);
        self.configured_topics
            .store(configured_topics, Ordering::Relaxed);
    }

    /// Record a failed poll
    #[inline]
    pub fn record_poll_failed(&self) {
        self.polls_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a topic-set change
    #[inline]
    pub fn record_topic_change(&self) {
        self.topic_changes.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of current values
    pub fn snapshot(&self) -> PollerSnapshot {
        PollerSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            polls_success: self.polls_success.load(Ordering::Relaxed),
            polls_failed: self.polls_failed.load(Ordering::Relaxed),
            topic_changes: self.topic_changes.load(Ordering::Relaxed),
            configured_topics: self.configured_topics.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of poller metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PollerSnapshot {
    pub polls: u64,
    pub polls_success: u64,
    pub polls_failed: u64,
    pub topic_changes: u64,
    pub configured_topics: u64,
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineSnapshot {
    /// Messages that entered normalization
    pub messages_processed: u64,
    /// Messages that normalized successfully
    pub messages_success: u64,
    /// Messages dropped during normalization
    pub messages_dropped: u64,
    /// Batches routed to completion
    pub batches_routed: u64,
    /// Batch route calls that failed
    pub batches_failed: u64,
    /// Route calls that hit a topic without a rule
    pub missing_rule_failures: u64,
    /// Chunks published to the sink
    pub chunks_published: u64,
    /// Chunk publishes that failed
    pub publish_failures: u64,
    /// Whole-batch retries performed by the orchestrator
    pub batch_retries: u64,
    /// Latency of the most recent message normalization (ms, gauge)
    pub last_process_ms: u64,
}

/// Trait for the poller to provide metrics to the reporter
pub trait PollerMetricsProvider: Send + Sync {
    /// Get a snapshot of current poller metrics
    fn poller_snapshot(&self) -> PollerSnapshot;
}

/// Trait for the pipeline to provide metrics to the reporter
pub trait PipelineMetricsProvider: Send + Sync {
    /// Get a snapshot of current pipeline metrics
    fn pipeline_snapshot(&self) -> PipelineSnapshot;
}

impl PollerMetricsProvider for PollerMetrics {
    fn poller_snapshot(&self) -> PollerSnapshot {
        self.snapshot()
    }
}
