//! Stdout sink
//!
//! Default `SinkClient` when no external pub/sub endpoint is wired in.
//! Every chunk is written as one line, which makes the bridge usable
//! as a pipeline stage and keeps local runs observable.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use pipestorm_pipeline::{SinkClient, SinkError};

/// Sink that writes each chunk as a `topic\tpayload` line on stdout
pub struct StdoutSink {
    stdout: Mutex<std::io::Stdout>,
    sequence: AtomicU64,
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSink {
    /// Create a stdout sink
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(std::io::stdout()),
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl SinkClient for StdoutSink {
    async fn publish(&self, target_topic: &str, payload: Bytes) -> Result<String, SinkError> {
        {
            let mut stdout = self.stdout.lock();
            stdout
                .write_all(target_topic.as_bytes())
                .and_then(|_| stdout.write_all(b"\t"))
                .and_then(|_| stdout.write_all(&payload))
                .and_then(|_| stdout.write_all(b"\n"))
                .and_then(|_| stdout.flush())
                .map_err(|e| SinkError::publish(target_topic, e.to_string()))?;
        }

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(format!("stdout-{}", seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_returns_sequential_ids() {
        let sink = StdoutSink::new();
        let a = sink.publish("out", Bytes::from_static(b"[]")).await.unwrap();
        let b = sink.publish("out", Bytes::from_static(b"[]")).await.unwrap();
        assert_eq!(a, "stdout-0");
        assert_eq!(b, "stdout-1");
    }
}
