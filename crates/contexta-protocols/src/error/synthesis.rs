//! Synthesis provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Synthesis unavailable: {0}")]
    Unavailable(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid synthesis response: {0}")]
    InvalidResponse(String),

    #[error("Synthesis timed out after {0} ms")]
    Timeout(u64),
}
