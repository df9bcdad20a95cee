//! Top-level pipeline errors surfaced to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Every retrieval path and synthesis failed for this query.
    #[error("Query failed: {0}. Please try again in a moment.")]
    QueryFailed(String),

    #[error("Query was cancelled")]
    Cancelled,

    #[error("Query exceeded its deadline of {0} ms")]
    DeadlineExceeded(u64),
}
