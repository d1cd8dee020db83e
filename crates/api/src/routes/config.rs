//! Routing-rule CRUD routes
//!
//! Mutations go to the configuration store only; the running table
//! picks them up on its next poll. 202 Accepted reflects exactly that
//! deferred visibility.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use pipestorm_routing::{Pipe, RoutingRule};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Request body for creating or replacing a rule
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRuleRequest {
    /// Broker topic the rule applies to
    pub source_topic: String,

    /// Delivery pipes
    pub pipes: Vec<Pipe>,

    /// Whether values should be JSON-parsed during normalization
    #[serde(default)]
    pub parse_as_json: bool,
}

/// Rule CRUD routes, nested under /api/config
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/topic",
            get(list_handler).post(create_handler).put(upsert_handler),
        )
        .route("/topic/{topic}", get(get_handler).delete(delete_handler))
}

/// List all routing rules
///
/// GET /api/config/topic
async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<RoutingRule>>> {
    Ok(Json(state.store.list().await?))
}

/// Get the rule for one source topic
///
/// GET /api/config/topic/{topic}
async fn get_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<RoutingRule>> {
    state
        .store
        .get(&topic)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("routing rule", &topic))
}

/// Create a rule; fails when the source topic already has one
///
/// POST /api/config/topic
async fn create_handler(
    State(state): State<AppState>,
    Json(request): Json<UpsertRuleRequest>,
) -> Result<(StatusCode, Json<RoutingRule>)> {
    if state.store.get(&request.source_topic).await?.is_some() {
        return Err(ApiError::conflict("routing rule", &request.source_topic));
    }

    let rule = state
        .store
        .upsert(&request.source_topic, request.pipes, request.parse_as_json)
        .await?;

    tracing::info!(source_topic = %rule.source_topic, "rule created");
    Ok((StatusCode::ACCEPTED, Json(rule)))
}

/// Create or replace a rule
///
/// PUT /api/config/topic
async fn upsert_handler(
    State(state): State<AppState>,
    Json(request): Json<UpsertRuleRequest>,
) -> Result<(StatusCode, Json<RoutingRule>)> {
    let rule = state
        .store
        .upsert(&request.source_topic, request.pipes, request.parse_as_json)
        .await?;

    tracing::info!(source_topic = %rule.source_topic, "rule upserted");
    Ok((StatusCode::ACCEPTED, Json(rule)))
}

/// Delete the rule for a source topic
///
/// DELETE /api/config/topic/{topic}
async fn delete_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<StatusCode> {
    state.store.delete(&topic).await?;
    tracing::info!(source_topic = %topic, "rule deleted");
    Ok(StatusCode::NO_CONTENT)
}
