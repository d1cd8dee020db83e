//! Application state
//!
//! Shared state for API handlers: the configuration store, the batch
//! router for manual produces and the process health flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pipestorm_pipeline::BatchRouter;
use pipestorm_routing::RoutingTable;
use pipestorm_store::ConfigStore;

/// Liveness and readiness flags shared with the bridge runtime
///
/// The process starts alive but not ready; readiness is granted once
/// the first table poll completed and the delivery loop is running.
/// Shutdown flips both back off.
#[derive(Debug)]
pub struct HealthState {
    alive: AtomicBool,
    ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create health state: alive, not yet ready
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    /// Whether the process should be considered alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Whether the process is ready to serve traffic
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Set the alive flag
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    /// Set the ready flag
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration store behind the CRUD endpoints
    pub store: Arc<dyn ConfigStore>,
    /// Router for manual produce requests
    pub router: Arc<BatchRouter>,
    /// Routing table, read for the index summary
    pub table: Arc<RoutingTable>,
    /// Process health flags
    pub health: Arc<HealthState>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<dyn ConfigStore>,
        router: Arc<BatchRouter>,
        table: Arc<RoutingTable>,
        health: Arc<HealthState>,
    ) -> Self {
        Self {
            store,
            router,
            table,
            health,
        }
    }
}
