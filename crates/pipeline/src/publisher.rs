//! Chunked publisher
//!
//! Splits a pipe's matched messages into fixed-size chunks, serializes
//! each chunk as a JSON array and publishes every chunk to the sink
//! concurrently. All publishes settle before the result is reported so
//! a single failed chunk never cancels its siblings mid-flight.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;

use pipestorm_protocol::ParsedMessage;

use crate::metrics::PipelineMetrics;
use crate::sink::{DeliveryReceipt, SinkClient, SinkError};

/// Publishes message chunks to the sink
pub struct ChunkedPublisher {
    sink: Arc<dyn SinkClient>,
    metrics: Arc<PipelineMetrics>,
    publish_timeout: Option<Duration>,
}

impl ChunkedPublisher {
    /// Create a publisher over a sink client
    pub fn new(sink: Arc<dyn SinkClient>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            sink,
            metrics,
            publish_timeout: None,
        }
    }

    /// Bound each chunk publish; a publish the sink never acknowledges
    /// within the timeout fails like any other publish failure
    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = Some(timeout);
        self
    }

    /// Publish `messages` to `target_topic` in chunks of `chunk_size`
    ///
    /// An empty slice publishes nothing and succeeds. The last chunk
    /// may be smaller than `chunk_size`.
    ///
    /// # Errors
    ///
    /// Returns the first chunk failure after every chunk settled;
    /// receipts for chunks that did succeed are dropped because the
    /// caller retries the whole batch anyway.
    pub async fn publish(
        &self,
        target_topic: &str,
        chunk_size: usize,
        messages: &[ParsedMessage],
    ) -> Result<Vec<DeliveryReceipt>, SinkError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let chunks: Vec<&[ParsedMessage]> = messages.chunks(chunk_size.max(1)).collect();
        let chunk_count = chunks.len();

        let publishes = chunks.into_iter().map(|chunk| async move {
            let payload = serde_json::to_vec(chunk).map_err(|source| SinkError::Encode {
                target_topic: target_topic.to_string(),
                source,
            })?;

            let publish = self.sink.publish(target_topic, Bytes::from(payload));
            let delivery_id = match self.publish_timeout {
                Some(limit) => tokio::time::timeout(limit, publish).await.map_err(|_| {
                    SinkError::publish(
                        target_topic,
                        format!("no acknowledgement within {}ms", limit.as_millis()),
                    )
                })??,
                None => publish.await?,
            };
            Ok(DeliveryReceipt {
                target_topic: target_topic.to_string(),
                delivery_id,
                message_count: chunk.len(),
            })
        });

        let mut receipts = Vec::with_capacity(chunk_count);
        let mut first_error = None;
        for settled in join_all(publishes).await {
            match settled {
                Ok(receipt) => {
                    self.metrics.record_chunk_published();
                    receipts.push(receipt);
                }
                Err(error) => {
                    self.metrics.record_publish_failure();
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => {
                tracing::debug!(
                    target_topic,
                    chunks = receipts.len(),
                    messages = messages.len(),
                    "chunks published"
                );
                Ok(receipts)
            }
        }
    }
}
