//! Pipestorm - Pipeline
//!
//! The delivery core: routes sorted broker batches through the routing
//! table, fans matched messages out to their pipes and publishes them
//! to the sink in chunks.
//!
//! # Design
//!
//! - `BatchRouter` implements the concurrency contract: topics in
//!   parallel, partitions in parallel, messages per partition in
//!   order, pipes in parallel. Siblings settle before an error
//!   surfaces.
//! - `ChunkedPublisher` serializes chunk arrays and publishes them
//!   through the `SinkClient` trait, the only seam to a concrete
//!   pub/sub SDK.
//! - `DeliveryOrchestrator` holds the at-least-once contract: ack
//!   after full delivery, unbounded retry with linear backoff.
//! - `PipelineMetrics` is the shared counter block all three report
//!   into.

mod error;
mod metrics;
mod orchestrator;
mod publisher;
mod router;
mod sink;

#[cfg(test)]
mod testutil;

#[cfg(test)]
mod router_test;

pub use error::{PipelineError, Result};
pub use metrics::PipelineMetrics;
pub use orchestrator::{ConsumedBatch, DeliveryOrchestrator};
pub use publisher::ChunkedPublisher;
pub use router::BatchRouter;
pub use sink::{DeliveryReceipt, SinkClient, SinkError};
