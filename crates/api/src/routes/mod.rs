//! API routes
//!
//! Domain-grouped HTTP route handlers.

pub mod config;
pub mod ops;
pub mod produce;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (index, health - no auth)
        .merge(ops::routes())
        // Rule CRUD
        .nest("/api/config", config::routes())
        // Manual batch submission
        .nest("/api", produce::routes())
        .with_state(state)
}
