//! Manual produce route
//!
//! Pushes a sorted batch straight through the router, bypassing the
//! broker feed and the orchestrator's retry loop. A failed produce
//! surfaces the routing error to the caller instead of retrying.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use pipestorm_protocol::SortedMessageBatch;

use crate::error::Result;
use crate::state::AppState;

/// Response for an accepted produce
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceResponse {
    /// Topics in the submitted batch
    pub topics: usize,
    /// Messages in the submitted batch
    pub messages: usize,
    /// Chunks delivered to the sink
    pub chunks: usize,
}

/// Produce routes, nested under /api
pub fn routes() -> Router<AppState> {
    Router::new().route("/produce", post(produce_handler))
}

/// Submit one sorted batch for immediate routing
///
/// POST /api/produce
///
/// Body shape: `{ topic: { partition: [message, ...] } }`.
async fn produce_handler(
    State(state): State<AppState>,
    Json(batch): Json<SortedMessageBatch>,
) -> Result<Json<ProduceResponse>> {
    let topics = batch.topic_count();
    let messages = batch.message_count();

    let receipts = state.router.route(&batch).await?;
    let chunks = receipts.len();

    tracing::info!(topics, messages, chunks, "manual batch produced");
    Ok(Json(ProduceResponse {
        topics,
        messages,
        chunks,
    }))
}
