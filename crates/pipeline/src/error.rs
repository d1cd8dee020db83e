//! Pipeline error types

use thiserror::Error;

use pipestorm_routing::RoutingError;

use crate::sink::SinkError;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while routing a batch
///
/// Any of these fails the whole batch: the orchestrator retries the
/// batch rather than acknowledging a partial delivery.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A consumed topic has no routing rule in the current snapshot
    #[error("no routing rule for consumed topic '{topic}'")]
    MissingRule {
        /// The topic without a rule
        topic: String,
    },

    /// A pipe filter failed to compile
    #[error(transparent)]
    Filter(#[from] RoutingError),

    /// The sink rejected a chunk
    #[error(transparent)]
    Sink(#[from] SinkError),
}
