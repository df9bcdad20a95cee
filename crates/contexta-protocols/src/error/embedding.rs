//! Embedding errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The embedding service could not be reached.
    #[error("Embedding service unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_carries_status() {
        let err = EmbeddingError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "Embedding API error (401): invalid api key");
    }

    #[test]
    fn test_unavailable_display() {
        let err = EmbeddingError::Unavailable("connection refused".to_string());
        assert!(err.to_string().starts_with("Embedding service unavailable"));
    }
}
