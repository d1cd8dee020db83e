//! Batch router
//!
//! Walks a sorted batch through the concurrency contract: topics in
//! parallel, partitions within a topic in parallel, messages within a
//! partition strictly in order, pipes of a message set in parallel.
//! Sibling units always settle before a failure is reported so one bad
//! topic never cancels another mid-publish.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use pipestorm_protocol::{normalize, now_ms, ParsedMessage, RawMessage, SortedMessageBatch};
use pipestorm_routing::{Pipe, Predicate, RoutingRule, RoutingTable};

use crate::error::{PipelineError, Result};
use crate::metrics::PipelineMetrics;
use crate::publisher::ChunkedPublisher;
use crate::sink::DeliveryReceipt;

/// Routes sorted batches through the table to the publisher
pub struct BatchRouter {
    table: Arc<RoutingTable>,
    publisher: ChunkedPublisher,
    metrics: Arc<PipelineMetrics>,
}

impl BatchRouter {
    /// Create a router over a routing table and publisher
    pub fn new(
        table: Arc<RoutingTable>,
        publisher: ChunkedPublisher,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            table,
            publisher,
            metrics,
        }
    }

    /// Metrics handle for the reporter
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Route one batch end to end, returning the delivery receipts
    /// for every chunk that was published
    ///
    /// # Errors
    ///
    /// Fails on a topic without a routing rule, a filter that does not
    /// compile, or any chunk the sink rejected. Every sibling topic
    /// still runs to completion first; the first error is returned,
    /// receipts for siblings that did succeed are dropped and the
    /// batch must not be acknowledged.
    pub async fn route(&self, batch: &SortedMessageBatch) -> Result<Vec<DeliveryReceipt>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let topics = batch
            .iter()
            .map(|(topic, partitions)| self.route_topic(topic, partitions));
        let settled = join_all(topics).await;

        let outcome = settled
            .into_iter()
            .collect::<Result<Vec<Vec<DeliveryReceipt>>>>();
        match outcome {
            Ok(receipts) => {
                self.metrics.record_batch_routed();
                Ok(receipts.into_iter().flatten().collect())
            }
            Err(error) => {
                self.metrics.record_batch_failed();
                Err(error)
            }
        }
    }

    async fn route_topic(
        &self,
        topic: &str,
        partitions: &BTreeMap<i32, Vec<RawMessage>>,
    ) -> Result<Vec<DeliveryReceipt>> {
        let Some(rule) = self.table.lookup(topic) else {
            self.metrics.record_missing_rule();
            return Err(PipelineError::MissingRule {
                topic: topic.to_string(),
            });
        };

        // compile each pipe's filter once per topic, not per message
        let pipes = rule
            .pipes
            .iter()
            .map(|pipe| Ok((pipe, Predicate::compile(&pipe.filter)?)))
            .collect::<Result<Vec<_>>>()?;

        let settled = join_all(
            partitions
                .values()
                .map(|messages| self.route_partition(topic, &rule, &pipes, messages)),
        )
        .await;

        let receipts = settled
            .into_iter()
            .collect::<Result<Vec<Vec<DeliveryReceipt>>>>()?;
        Ok(receipts.into_iter().flatten().collect())
    }

    async fn route_partition(
        &self,
        topic: &str,
        rule: &RoutingRule,
        pipes: &[(&Pipe, Predicate)],
        messages: &[RawMessage],
    ) -> Result<Vec<DeliveryReceipt>> {
        // log order within a partition is the one ordering guarantee
        // the broker gives us, so normalization stays sequential
        let mut parsed = Vec::with_capacity(messages.len());
        for raw in messages {
            self.metrics.record_message();
            let started = Instant::now();

            match normalize(raw, rule.parse_as_json, now_ms()) {
                Some(message) => {
                    self.metrics
                        .record_message_success(started.elapsed().as_millis() as u64);
                    parsed.push(message);
                }
                None => {
                    self.metrics.record_dropped(topic);
                    tracing::warn!(topic, offset = raw.offset, "dropping malformed message");
                }
            }
        }

        let settled = join_all(pipes.iter().map(|(pipe, predicate)| {
            let matched: Vec<ParsedMessage> = parsed
                .iter()
                .filter(|message| pipe.publish_tombstones || !message.is_tombstone())
                .filter(|message| predicate.matches(message))
                .cloned()
                .collect();

            async move {
                let receipts = self
                    .publisher
                    .publish(&pipe.target_topic, pipe.chunk_size, &matched)
                    .await?;
                Ok(receipts)
            }
        }))
        .await;

        let receipts = settled
            .into_iter()
            .collect::<Result<Vec<Vec<DeliveryReceipt>>>>()?;
        Ok(receipts.into_iter().flatten().collect())
    }
}
