//! Store error types

use thiserror::Error;

use pipestorm_routing::RoutingError;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the configuration store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),

    /// A rule failed validation at upsert time
    #[error(transparent)]
    InvalidRule(#[from] RoutingError),

    /// Upserting a rule without pipes would silently drop traffic
    #[error("routing rule for '{source_topic}' must have at least one pipe")]
    NoPipes {
        /// Source topic of the rejected rule
        source_topic: String,
    },
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether this error is a validation failure (caller error) as
    /// opposed to a store outage
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRule(_) | Self::NoPipes { .. })
    }
}
