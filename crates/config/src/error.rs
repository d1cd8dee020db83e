//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - a value that must be positive is zero
    #[error("{section}.{field} must be greater than zero")]
    ZeroValue {
        /// Config section name
        section: &'static str,
        /// Field name
        field: &'static str,
    },
}

impl ConfigError {
    /// Create a ZeroValue error
    pub fn zero_value(section: &'static str, field: &'static str) -> Self {
        Self::ZeroValue { section, field }
    }
}
