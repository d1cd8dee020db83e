//! Pipestorm - broker-to-pub/sub routing bridge
//!
//! # Usage
//!
//! ```bash
//! # Run the bridge (admin API on port 1919)
//! pipestorm
//! pipestorm --config configs/pipestorm.toml
//!
//! # Feed newline-delimited sorted batches on stdin
//! cat batches.ndjson | pipestorm --stdin-feed
//! ```

mod feed;
mod serve;
mod sink;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipestorm_config::{Config, LogFormat};

/// Pipestorm - broker-to-pub/sub routing bridge
#[derive(Parser, Debug)]
#[command(name = "pipestorm")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/pipestorm.toml")]
    config: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the
    /// config file's [log] section
    #[arg(short, long)]
    log_level: Option<String>,

    /// Consume newline-delimited sorted batches from stdin
    #[arg(long)]
    stdin_feed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (level, format) = resolve_logging(cli.log_level.as_deref(), &cli.config);
    init_logging(&level, format)?;

    serve::run(serve::ServeArgs {
        config: cli.config,
        stdin_feed: cli.stdin_feed,
    })
    .await
}

/// Resolve log level: CLI flag > config file > default "info". The
/// output format always comes from the config file.
fn resolve_logging(cli_level: Option<&str>, config_path: &Path) -> (String, LogFormat) {
    let config = if config_path.exists() {
        Config::from_file(config_path).ok()
    } else {
        None
    };

    let format = config.as_ref().map(|c| c.log.format).unwrap_or_default();
    let level = match cli_level {
        Some(level) => level.to_string(),
        None => match &config {
            Some(config) => config.log.level.as_str().to_string(),
            None => "info".to_string(),
        },
    };

    (level, format)
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
    }

    Ok(())
}
