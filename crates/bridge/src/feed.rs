//! Consumption feed
//!
//! Stands in for a broker client: `run_stdin_feed` turns
//! newline-delimited sorted-batch JSON on stdin into `ConsumedBatch`es
//! and waits for each acknowledgement before reading the next line,
//! which is exactly the pause/resume backpressure a real consumer
//! applies. `drain_table_events` is where a broker client would adjust
//! its subscription.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use pipestorm_pipeline::ConsumedBatch;
use pipestorm_protocol::SortedMessageBatch;
use pipestorm_store::TableEvent;

/// Read sorted batches from stdin and feed them into the pipeline
///
/// One JSON document per line, shaped `{ topic: { partition: [...] } }`.
/// A line that does not parse is logged and skipped.
pub async fn run_stdin_feed(feed: mpsc::Sender<ConsumedBatch>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("stdin feed started");

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("stdin feed reached end of input");
                break;
            }
            Err(error) => {
                tracing::error!(%error, "stdin read failed");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let batch: SortedMessageBatch = match serde_json::from_str(&line) {
            Ok(batch) => batch,
            Err(error) => {
                tracing::warn!(%error, "skipping unparseable batch line");
                continue;
            }
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if feed
            .send(ConsumedBatch {
                batch,
                ack: ack_tx,
            })
            .await
            .is_err()
        {
            tracing::info!("delivery loop gone, stopping stdin feed");
            break;
        }

        // hold consumption until the batch is fully delivered
        if ack_rx.await.is_err() {
            tracing::info!("delivery loop dropped the ack, stopping stdin feed");
            break;
        }
        tracing::debug!("batch acknowledged");
    }
}

/// Drain topic-set changes from the table poller
///
/// With a real broker client this is the resubscription point; the
/// stdin feed has no subscription, so the new topic set is logged.
pub async fn drain_table_events(
    mut events: mpsc::Receiver<TableEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Some(TableEvent::TopicSetChanged(topics)) => {
                tracing::info!(?topics, "adjusting subscription to new topic set");
            }
            None => break,
        }
    }
}
