//! In-process brute-force vector index.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use contexta_protocols::{
    CandidateSnippet, Embedding, EmbeddingProvider, Origin, RetrievalError, VectorQuery,
    VectorSearch,
};

struct IndexedSnippet {
    snippet: CandidateSnippet,
    embedding: Embedding,
}

/// Cosine-similarity search over snippets held in memory.
pub struct MemoryVectorSearch {
    provider: Arc<dyn EmbeddingProvider>,
    entries: RwLock<HashMap<String, IndexedSnippet>>,
}

impl MemoryVectorSearch {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Embed and insert snippets, replacing any with the same id.
    pub async fn index(&self, snippets: Vec<CandidateSnippet>) -> Result<(), RetrievalError> {
        let texts: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != snippets.len() {
            return Err(RetrievalError::IndexUnavailable(format!(
                "embedding provider returned {} vectors for {} snippets",
                embeddings.len(),
                snippets.len()
            )));
        }

        let mut entries = self.entries.write();
        for (snippet, embedding) in snippets.into_iter().zip(embeddings) {
            entries.insert(snippet.id.clone(), IndexedSnippet { snippet, embedding });
        }
        debug!(total = entries.len(), "Indexed snippets in memory");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.entries.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl VectorSearch for MemoryVectorSearch {
    fn id(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        query: VectorQuery,
        limit: usize,
    ) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        let embedding = match query {
            VectorQuery::Embedding(embedding) => embedding,
            VectorQuery::Text(text) => {
                if text.trim().is_empty() {
                    return Err(RetrievalError::InvalidInput("empty query text".to_string()));
                }
                self.provider.embed(&text).await?
            }
        };

        let entries = self.entries.read();
        let mut results: Vec<CandidateSnippet> = entries
            .values()
            .map(|entry| {
                let mut snippet = entry.snippet.clone();
                snippet.score = embedding.cosine_similarity(&entry.embedding);
                snippet.origin = Origin::Vector;
                snippet
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleHashEmbedding;

    fn doc(id: &str, text: &str) -> CandidateSnippet {
        CandidateSnippet::new(id, "technical_docs", text, Origin::Keyword, 0.0)
    }

    async fn seeded() -> MemoryVectorSearch {
        let index = MemoryVectorSearch::new(Arc::new(SimpleHashEmbedding::new(256)));
        index
            .index(vec![
                doc("a", "Lakers game recap from last night"),
                doc("b", "Camera calibration checklist for studio two"),
                doc("c", "Lakers injury report before the game"),
            ])
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let index = seeded().await;
        let results = index.search("Lakers game".into(), 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.origin == Origin::Vector));
        assert!(results[0].score >= results[1].score);
        assert!(results.iter().all(|r| r.id != "b"));
    }

    #[tokio::test]
    async fn test_search_with_embedding() {
        let provider = SimpleHashEmbedding::new(256);
        let index = seeded().await;
        let query = provider.embed("camera calibration").await.unwrap();
        let results = index.search(query.into(), 1).await.unwrap();
        assert_eq!(results[0].id, "b");
    }

    #[tokio::test]
    async fn test_reindex_replaces() {
        let index = seeded().await;
        index.index(vec![doc("a", "Replaced")]).await.unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let index = seeded().await;
        let err = index.search(" ".into(), 5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_index() {
        let index = MemoryVectorSearch::new(Arc::new(SimpleHashEmbedding::default()));
        assert!(index.is_empty());
        assert!(index.search("anything".into(), 5).await.unwrap().is_empty());
    }
}
