//! Operations routes
//!
//! Index documents and health probes. These routes do not require
//! authentication and carry no side effects.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Index response listing the available surface
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    /// Service name
    pub service: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Routes below this one
    pub routes: Vec<&'static str>,
    /// Rules currently loaded in the routing table
    pub configured_topics: usize,
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "UP" or "DOWN"
    pub status: &'static str,
}

/// Operations routes (index, health)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/api", get(api_index_handler))
        .route("/healthcheck", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// Service index
///
/// GET /
async fn index_handler(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "pipestorm",
        version: env!("CARGO_PKG_VERSION"),
        routes: vec!["/api", "/healthcheck", "/ready"],
        configured_topics: state.table.rule_count(),
    })
}

/// API index
///
/// GET /api
async fn api_index_handler(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "pipestorm",
        version: env!("CARGO_PKG_VERSION"),
        routes: vec!["/api/config/topic", "/api/produce"],
        configured_topics: state.table.rule_count(),
    })
}

/// Liveness probe
///
/// GET /healthcheck
///
/// 200 while the process considers itself alive, 503 once shutdown
/// started.
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    probe(state.health.is_alive())
}

/// Readiness probe
///
/// GET /ready
///
/// 200 only after the first table poll completed and the delivery
/// loop is running.
async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    probe(state.health.is_ready())
}

fn probe(up: bool) -> (StatusCode, Json<HealthResponse>) {
    if up {
        (StatusCode::OK, Json(HealthResponse { status: "UP" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "DOWN" }),
        )
    }
}
