//! Pipestorm - Metrics
//!
//! Atomic counter structs, provider traits and a periodic reporter
//! that logs snapshots through `tracing`.
//!
//! # Design
//!
//! - Components own their counters and update them with relaxed atomic
//!   operations; values are eventually consistent, not real-time.
//! - Provider traits expose point-in-time snapshots so the reporter
//!   can collect metrics without knowing concrete component types.
//! - Export formatting is deliberately out of scope; snapshots are
//!   serializable and logged as structured fields.

mod reporter;
mod traits;

pub use reporter::MetricsReporter;
pub use traits::{
    PipelineMetricsProvider, PipelineSnapshot, PollerMetrics, PollerMetricsProvider,
    PollerSnapshot,
};
