//! Periodic metrics reporter
//!
//! Logs component snapshots at a fixed interval. This is deliberately
//! log-based: export formatting lives outside the bridge.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::traits::{PipelineMetricsProvider, PollerMetricsProvider};

/// Collects snapshots from registered providers and logs them
pub struct MetricsReporter {
    interval: Duration,
    pipeline: Option<Arc<dyn PipelineMetricsProvider>>,
    poller: Option<Arc<dyn PollerMetricsProvider>>,
}

impl MetricsReporter {
    /// Create a reporter with the given reporting interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pipeline: None,
            poller: None,
        }
    }

    /// Register the pipeline metrics provider
    pub fn with_pipeline(mut self, provider: Arc<dyn PipelineMetricsProvider>) -> Self {
        self.pipeline = Some(provider);
        self
    }

    /// Register the poller metrics provider
    pub fn with_poller(mut self, provider: Arc<dyn PollerMetricsProvider>) -> Self {
        self.poller = Some(provider);
        self
    }

    /// Log one round of snapshots
    pub fn report(&self) {
        if let Some(pipeline) = &self.pipeline {
            let s = pipeline.pipeline_snapshot();
            tracing::info!(
                messages_processed = s.messages_processed,
                messages_success = s.messages_success,
                messages_dropped = s.messages_dropped,
                batches_routed = s.batches_routed,
                batches_failed = s.batches_failed,
                missing_rule_failures = s.missing_rule_failures,
                chunks_published = s.chunks_published,
                publish_failures = s.publish_failures,
                batch_retries = s.batch_retries,
                last_process_ms = s.last_process_ms,
                "pipeline metrics"
            );
        }

        if let Some(poller) = &self.poller {
            let s = poller.poller_snapshot();
            tracing::info!(
                polls = s.polls,
                polls_success = s.polls_success,
                polls_failed = s.polls_failed,
                topic_changes = s.topic_changes,
                configured_topics = s.configured_topics,
                "poller metrics"
            );
        }
    }

    /// Run the reporter until cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        // the immediate first tick would log all-zero counters
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.report(),
            }
        }

        tracing::debug!("metrics reporter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PipelineSnapshot, PollerMetrics};

    struct FixedPipeline;

    impl PipelineMetricsProvider for FixedPipeline {
        fn pipeline_snapshot(&self) -> PipelineSnapshot {
            PipelineSnapshot {
                messages_processed: 10,
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_report_with_providers_does_not_panic() {
        let reporter = MetricsReporter::new(Duration::from_secs(10))
            .with_pipeline(Arc::new(FixedPipeline))
            .with_poller(Arc::new(PollerMetrics::new()));

        reporter.report();
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let reporter = MetricsReporter::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();

        // returns promptly once the token is cancelled
        reporter.run(token).await;
    }
}
