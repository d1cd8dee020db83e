//! Pipestorm Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid configuration - only specify what you need
//! to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use pipestorm_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[http]\nport = 1919").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [store]
//! poll_interval_secs = 15
//!
//! [pipeline]
//! retry_base_ms = 1000
//!
//! [http]
//! port = 1919
//! ```

mod error;
mod logging;
mod sections;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use sections::{HttpConfig, MetricsConfig, PipelineConfig, SinkConfig, StoreConfig};

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Configuration store access
    pub store: StoreConfig,

    /// Pub/sub sink behavior
    pub sink: SinkConfig,

    /// Delivery pipeline behavior
    pub pipeline: PipelineConfig,

    /// Admin HTTP server
    pub http: HttpConfig,

    /// Metrics reporting
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.store.poll_interval_secs == 0 {
            return Err(ConfigError::zero_value("store", "poll_interval_secs"));
        }
        if self.store.request_timeout_ms == 0 {
            return Err(ConfigError::zero_value("store", "request_timeout_ms"));
        }
        if self.sink.publish_timeout_ms == 0 {
            return Err(ConfigError::zero_value("sink", "publish_timeout_ms"));
        }
        if self.pipeline.retry_base_ms == 0 {
            return Err(ConfigError::zero_value("pipeline", "retry_base_ms"));
        }
        if self.pipeline.feed_queue_size == 0 {
            return Err(ConfigError::zero_value("pipeline", "feed_queue_size"));
        }
        if self.metrics.enabled && self.metrics.interval_secs == 0 {
            return Err(ConfigError::zero_value("metrics", "interval_secs"));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
