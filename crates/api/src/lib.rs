//! Pipestorm - API
//!
//! The admin HTTP surface: routing-rule CRUD against the
//! configuration store, manual batch submission through the router,
//! and liveness/readiness probes.
//!
//! # Design
//!
//! - Rule mutations touch only the store and answer 202; the running
//!   table converges on the next poll.
//! - `POST /api/produce` bypasses the broker feed and the retry loop,
//!   surfacing routing errors straight to the caller.
//! - `ApiError` maps error classes onto status codes and renders a
//!   structured `{ error, message }` body.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse, Result};
pub use routes::build_router;
pub use state::{AppState, HealthState};
