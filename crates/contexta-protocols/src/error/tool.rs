//! External tool errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Network or connection failure; the only kind worth an immediate retry.
    #[error("Tool unavailable: {0}")]
    Unavailable(String),

    #[error("Tool call timed out after {0} ms")]
    Timeout(u64),

    /// The remote service answered with a domain error.
    #[error("Tool error [{code}]: {message}")]
    Remote { code: String, message: String },

    #[error("Invalid tool request: {0}")]
    InvalidRequest(String),
}

impl ToolError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether an immediate retry may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Stable reason code reported to callers.
    pub fn reason_code(&self) -> &str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Timeout(_) => "timeout",
            Self::Remote { code, .. } => code,
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}
