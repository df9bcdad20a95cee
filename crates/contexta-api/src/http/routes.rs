//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{banner, health, run_query};
use crate::state::AppState;

/// Build the router.
///
/// ```text
/// POST /query   - run the pipeline for one query
/// GET  /health  - health check
/// GET  /        - banner
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/query", post(run_query))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
