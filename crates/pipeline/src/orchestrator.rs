//! Delivery orchestrator
//!
//! Owns the at-least-once contract: a consumed batch is acknowledged
//! back to the broker feed only after the router delivered it in full.
//! A failed batch is retried in place with a linearly growing delay
//! and no retry cap; duplicate publishes on the sink side are the
//! accepted cost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use pipestorm_protocol::SortedMessageBatch;

use crate::metrics::PipelineMetrics;
use crate::router::BatchRouter;

/// One consumed batch with its acknowledgement handle
#[derive(Debug)]
pub struct ConsumedBatch {
    /// The sorted batch to deliver
    pub batch: SortedMessageBatch,
    /// Fired exactly once, after the batch was fully delivered
    pub ack: oneshot::Sender<()>,
}

/// Drains the consumption feed and drives batches through the router
pub struct DeliveryOrchestrator {
    router: Arc<BatchRouter>,
    retry_base: Duration,
    metrics: Arc<PipelineMetrics>,
}

impl DeliveryOrchestrator {
    /// Create an orchestrator with the given retry base delay
    pub fn new(router: Arc<BatchRouter>, retry_base: Duration) -> Self {
        let metrics = router.metrics();
        Self {
            router,
            retry_base,
            metrics,
        }
    }

    /// Deliver one batch, retrying until it goes through
    ///
    /// The delay before attempt `n` is `n * retry_base`. Table polling
    /// continues in the background, so a batch stuck on a missing rule
    /// starts flowing as soon as the rule appears.
    pub async fn deliver(&self, batch: &SortedMessageBatch) {
        let mut attempt: u32 = 0;

        loop {
            match self.router.route(batch).await {
                Ok(_) => return,
                Err(error) => {
                    attempt += 1;
                    self.metrics.record_batch_retry();

                    let delay = self.retry_base * attempt;
                    tracing::warn!(
                        %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "batch delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Run the delivery loop until cancelled or the feed closes
    ///
    /// Cancellation is only observed between batches: a batch that
    /// entered delivery is finished and acknowledged before the loop
    /// exits, never abandoned half-published.
    pub async fn run(self, mut feed: mpsc::Receiver<ConsumedBatch>, shutdown: CancellationToken) {
        tracing::info!("delivery orchestrator starting");

        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => break,
                next = feed.recv() => next,
            };

            let Some(ConsumedBatch { batch, ack }) = next else {
                tracing::info!("consumption feed closed");
                break;
            };

            tracing::debug!(
                topics = batch.topic_count(),
                messages = batch.message_count(),
                "batch received"
            );
            self.deliver(&batch).await;

            if ack.send(()).is_err() {
                tracing::debug!("batch ack receiver dropped");
            }
        }

        tracing::info!("delivery orchestrator stopped");
    }
}
