//! Query and health handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use contexta_protocols::{AssistantResponse, Query};

use crate::error::ApiError;
use crate::state::{AppState, Outcome, QueryStats};

pub const SERVICE_NAME: &str = "contexta";

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Missing is treated like empty so both answer 400.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub uptime_seconds: u64,
    pub queries: QueryStats,
}

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub status: &'static str,
    pub message: String,
}

/// Answer one query.
///
/// POST /query
pub async fn run_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AssistantResponse>, ApiError> {
    state.record_received();

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            state.record_outcome(Outcome::Failed);
            warn!(error = %rejection.body_text(), "Rejected query body");
            return Err(ApiError::BadRequest(rejection.body_text()));
        }
    };
    if req.query.trim().is_empty() {
        state.record_outcome(Outcome::Failed);
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let mut query = Query::new(req.query);
    if let Some(session_id) = req.session_id {
        query = query.with_session(session_id);
    }
    info!(query_id = query.id(), session = ?query.session_id(), "Received query");

    // Dropping this future on client disconnect cancels every sub-call.
    match state.orchestrator.run(&query).await {
        Ok(response) => {
            state.record_outcome(if response.is_degraded() {
                Outcome::Degraded
            } else {
                Outcome::Answered
            });
            info!(
                query_id = query.id(),
                degraded = response.is_degraded(),
                snippets = response.snippets.len(),
                "Query answered"
            );
            Ok(Json(response))
        }
        Err(e) => {
            state.record_outcome(Outcome::Failed);
            warn!(query_id = query.id(), error = %e, "Query failed");
            Err(e.into())
        }
    }
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        uptime_seconds: state.uptime().as_secs(),
        queries: state.stats(),
    })
}

/// GET /
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        status: "ok",
        message: format!("{} query API is running", SERVICE_NAME),
    })
}
