//! Retrieval adapter errors.

use thiserror::Error;

use super::EmbeddingError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
