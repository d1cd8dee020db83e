//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors raised when validating rules or compiling filters
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Filter keys must be dot-separated field paths, not array indices
    #[error("filter key '{key}' contains '[' or ']', only dotted paths are allowed")]
    BracketInFilterKey {
        /// The offending key
        key: String,
    },

    /// Filter values must be scalars
    #[error("filter value for '{key}' must be a scalar, not an array or object")]
    NonScalarFilterValue {
        /// The offending key
        key: String,
    },

    /// A pipe needs a destination
    #[error("pipe has no target topic")]
    EmptyTargetTopic,

    /// Chunk sizes below one would stall the publisher
    #[error("pipe for '{target_topic}' has chunk size 0, must be at least 1")]
    ZeroChunkSize {
        /// Destination of the offending pipe
        target_topic: String,
    },

    /// A rule needs a source topic
    #[error("routing rule has no source topic")]
    EmptySourceTopic,
}
