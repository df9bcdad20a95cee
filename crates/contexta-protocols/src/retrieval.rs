//! Retrieval adapter traits.

use async_trait::async_trait;

use crate::embedding::Embedding;
use crate::error::RetrievalError;
use crate::snippet::CandidateSnippet;

/// Default result cap for a retrieval call.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Sparse full-text retrieval.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Backend identifier used in logs.
    fn id(&self) -> &str;

    /// Search for `text`, returning at most `limit` snippets ordered by
    /// descending score. `text` must be non-empty after trimming.
    async fn search(&self, text: &str, limit: usize)
        -> Result<Vec<CandidateSnippet>, RetrievalError>;
}

/// Input to a dense similarity search.
#[derive(Debug, Clone)]
pub enum VectorQuery {
    /// Raw text; the adapter obtains its embedding first.
    Text(String),
    Embedding(Embedding),
}

impl From<&str> for VectorQuery {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Embedding> for VectorQuery {
    fn from(embedding: Embedding) -> Self {
        Self::Embedding(embedding)
    }
}

/// Dense similarity retrieval.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Backend identifier used in logs.
    fn id(&self) -> &str;

    /// Nearest-neighbor search returning at most `limit` snippets ordered
    /// by descending similarity.
    async fn search(
        &self,
        query: VectorQuery,
        limit: usize,
    ) -> Result<Vec<CandidateSnippet>, RetrievalError>;
}
