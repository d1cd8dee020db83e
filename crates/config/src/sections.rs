//! Per-component configuration sections

use std::time::Duration;

use serde::Deserialize;

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_request_timeout_ms() -> u64 {
    2_000
}

/// Configuration store section
///
/// # Example
///
/// ```toml
/// [store]
/// poll_interval_secs = 15
/// request_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Seconds between routing-table refresh polls
    /// Default: 15
    pub poll_interval_secs: u64,

    /// Timeout for a single store request in milliseconds
    /// Default: 2000
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_publish_timeout_ms() -> u64 {
    10_000
}

/// Pub/sub sink section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Timeout for a single chunk publish in milliseconds
    /// Default: 10000
    pub publish_timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

impl SinkConfig {
    /// Publish timeout as a `Duration`
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

fn default_retry_base_ms() -> u64 {
    1_000
}

fn default_feed_queue_size() -> usize {
    64
}

/// Delivery pipeline section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base delay for batch retries in milliseconds; attempt `n`
    /// waits `n` times this value
    /// Default: 1000
    pub retry_base_ms: u64,

    /// Capacity of the consumption feed channel
    /// Default: 64
    pub feed_queue_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_base_ms: default_retry_base_ms(),
            feed_queue_size: default_feed_queue_size(),
        }
    }
}

impl PipelineConfig {
    /// Retry base delay as a `Duration`
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1919
}

/// Admin HTTP server section
///
/// # Example
///
/// ```toml
/// [http]
/// host = "127.0.0.1"
/// port = 1919
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    /// Default: 0.0.0.0
    pub host: String,

    /// Listen port
    /// Default: 1919
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HttpConfig {
    /// Socket address string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_metrics_interval_secs() -> u64 {
    60
}

/// Metrics reporting section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether periodic metrics logging is enabled
    /// Default: true
    pub enabled: bool,

    /// Seconds between metrics reports
    /// Default: 60
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_metrics_interval_secs(),
        }
    }
}

impl MetricsConfig {
    /// Report interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
