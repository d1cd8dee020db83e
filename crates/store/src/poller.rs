//! Routing-table refresh poller
//!
//! Pulls the full rule set from the configuration store on a fixed
//! interval and swaps it into the routing table. Callers run the
//! first poll explicitly via `poll_once` before consumption starts;
//! `run` then continues the cadence one interval later.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pipestorm_metrics::PollerMetrics;
use pipestorm_routing::RoutingTable;

use crate::error::{Result, StoreError};
use crate::ConfigStore;

/// Events emitted by the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// The set of configured source topics changed; carries the new
    /// sorted topic list for subscription adjustment
    TopicSetChanged(Vec<String>),
}

/// Periodic refresh loop for the routing table
pub struct TablePoller {
    store: Arc<dyn ConfigStore>,
    table: Arc<RoutingTable>,
    interval: Duration,
    request_timeout: Option<Duration>,
    events: mpsc::Sender<TableEvent>,
    metrics: Arc<PollerMetrics>,
}

impl TablePoller {
    /// Create a poller refreshing `table` from `store`
    pub fn new(
        store: Arc<dyn ConfigStore>,
        table: Arc<RoutingTable>,
        interval: Duration,
        events: mpsc::Sender<TableEvent>,
    ) -> Self {
        Self {
            store,
            table,
            interval,
            request_timeout: None,
            events,
            metrics: Arc::new(PollerMetrics::new()),
        }
    }

    /// Bound each store request; a request exceeding the timeout
    /// counts as store unavailability
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Metrics handle for the reporter
    pub fn metrics(&self) -> Arc<PollerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one refresh cycle
    ///
    /// On success the snapshot is swapped in unconditionally; a
    /// topic-set change additionally emits a `TableEvent`.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous snapshot stays active.
    pub async fn poll_once(&self) -> Result<()> {
        self.metrics.record_poll();

        let rules = match self.list_rules().await {
            Ok(rules) => rules,
            Err(error) => {
                self.metrics.record_poll_failed();
                return Err(error);
            }
        };
        self.metrics.record_poll_success(rules.len() as u64);

        if let Some(topics) = self.table.apply(rules) {
            self.metrics.record_topic_change();
            tracing::info!(topics = topics.len(), "topic set changed");

            // the receiver adjusts the broker subscription; a dropped
            // receiver only means nobody is listening anymore
            if self.events.send(TableEvent::TopicSetChanged(topics)).await.is_err() {
                tracing::debug!("table event receiver dropped");
            }
        }

        Ok(())
    }

    async fn list_rules(&self) -> Result<Vec<pipestorm_routing::RoutingRule>> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.list())
                .await
                .map_err(|_| {
                    StoreError::unavailable(format!(
                        "list request timed out after {}ms",
                        limit.as_millis()
                    ))
                })?,
            None => self.store.list().await,
        }
    }

    /// Run the poller until cancelled
    ///
    /// The first tick fires one full interval in; the caller performs
    /// the startup poll via `poll_once` before spawning this loop. A
    /// failed poll is logged and counted; the table keeps serving the
    /// previous snapshot rather than being blanked.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "table poller starting");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await; // the immediate tick; startup already polled

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(error) = self.poll_once().await {
                        tracing::error!(%error, "routing-table poll failed, keeping previous snapshot");
                    }
                }
            }
        }

        tracing::info!("table poller stopped");
    }
}
