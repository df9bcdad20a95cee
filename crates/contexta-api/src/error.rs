//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use contexta_protocols::PipelineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Pipeline(PipelineError::InvalidQuery(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::QueryFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(PipelineError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            // Client went away; nobody reads this.
            ApiError::Pipeline(PipelineError::Cancelled) => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
