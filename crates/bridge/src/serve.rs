//! Bridge runtime wiring
//!
//! Builds the object graph (store → poller → table → router →
//! orchestrator → API), spawns the long-running tasks and coordinates
//! graceful shutdown through one cancellation token.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pipestorm_api::{build_router, AppState, HealthState};
use pipestorm_config::Config;
use pipestorm_metrics::MetricsReporter;
use pipestorm_pipeline::{BatchRouter, ChunkedPublisher, DeliveryOrchestrator, PipelineMetrics};
use pipestorm_routing::RoutingTable;
use pipestorm_store::{ConfigStore, MemoryStore, TablePoller};

use crate::feed;
use crate::sink::StdoutSink;

/// Arguments for the serve run
pub struct ServeArgs {
    /// Configuration file path
    pub config: PathBuf,
    /// Whether to consume batches from stdin
    pub stdin_feed: bool,
}

/// Run the bridge until SIGINT/SIGTERM
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    tracing::info!(
        http = %config.http.bind_addr(),
        poll_interval_secs = config.store.poll_interval_secs,
        "starting pipestorm bridge"
    );

    let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
    let table = Arc::new(RoutingTable::new());
    let health = Arc::new(HealthState::new());
    let shutdown = CancellationToken::new();

    // table refresh
    let (event_tx, event_rx) = mpsc::channel(16);
    let poller = TablePoller::new(
        Arc::clone(&store),
        Arc::clone(&table),
        config.store.poll_interval(),
        event_tx,
    )
    .with_request_timeout(config.store.request_timeout());
    let poller_metrics = poller.metrics();

    // delivery pipeline
    let pipeline_metrics = Arc::new(PipelineMetrics::new());
    let publisher = ChunkedPublisher::new(Arc::new(StdoutSink::new()), Arc::clone(&pipeline_metrics))
        .with_publish_timeout(config.sink.publish_timeout());
    let router = Arc::new(BatchRouter::new(
        Arc::clone(&table),
        publisher,
        Arc::clone(&pipeline_metrics),
    ));
    let orchestrator = DeliveryOrchestrator::new(Arc::clone(&router), config.pipeline.retry_base());
    let (feed_tx, feed_rx) = mpsc::channel(config.pipeline.feed_queue_size);

    // first poll before anything consumes, so an existing rule set is
    // live when the feed starts
    if let Err(error) = poller.poll_once().await {
        tracing::error!(%error, "initial poll failed, starting with an empty table");
    }

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(poller.run(shutdown.clone())));
    tasks.push(tokio::spawn(orchestrator.run(feed_rx, shutdown.clone())));
    tasks.push(tokio::spawn(feed::drain_table_events(
        event_rx,
        shutdown.clone(),
    )));

    if config.metrics.enabled {
        let reporter = MetricsReporter::new(config.metrics.interval())
            .with_pipeline(Arc::clone(&pipeline_metrics) as _)
            .with_poller(poller_metrics as _);
        tasks.push(tokio::spawn(reporter.run(shutdown.clone())));
    }

    if args.stdin_feed {
        tasks.push(tokio::spawn(feed::run_stdin_feed(
            feed_tx.clone(),
            shutdown.clone(),
        )));
    }

    // admin API
    let state = AppState::new(
        Arc::clone(&store),
        Arc::clone(&router),
        Arc::clone(&table),
        Arc::clone(&health),
    );
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.http.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.http.bind_addr()))?;
    tracing::info!(addr = %config.http.bind_addr(), "admin API listening");

    health.set_ready(true);

    // shutdown watcher: flip health first so probes fail while tasks
    // drain, then cancel
    {
        let health = Arc::clone(&health);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown().await;
            tracing::info!("shutdown signal received");
            health.set_ready(false);
            health.set_alive(false);
            shutdown.cancel();
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("admin API server failed")?;

    drop(feed_tx);
    for task in tasks {
        if let Err(error) = task.await {
            tracing::error!(%error, "task ended abnormally");
        }
    }

    tracing::info!("bridge stopped");
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("loading {}", path.display()))
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
