//! Chroma HTTP adapter searching several collections at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use contexta_protocols::{
    CandidateSnippet, Embedding, EmbeddingProvider, Origin, RetrievalError, SnippetMetadata,
    VectorQuery, VectorSearch,
};

/// Chroma connection settings.
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub base_url: String,
    pub collections: Vec<String>,
    pub timeout: Duration,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            collections: [
                "broadcast_transcripts",
                "production_metadata",
                "technical_docs",
                "industry_news",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Map a Chroma distance onto a similarity in (0, 1]; smaller distance
/// is more similar.
pub fn distance_to_similarity(distance: f32) -> f32 {
    if !distance.is_finite() || distance < 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + distance)
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

/// Chroma returns one inner list per query embedding.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Map<String, serde_json::Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

/// Vector search over a Chroma server.
pub struct ChromaVectorSearch {
    client: reqwest::Client,
    config: ChromaConfig,
    provider: Arc<dyn EmbeddingProvider>,
    /// Collection name to id, resolved lazily.
    collection_ids: RwLock<HashMap<String, String>>,
}

impl ChromaVectorSearch {
    pub fn new(config: ChromaConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            provider,
            collection_ids: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ChromaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn collection_id(&self, name: &str) -> Result<String, RetrievalError> {
        let cached = self.collection_ids.read().get(name).cloned();
        if let Some(id) = cached {
            return Ok(id);
        }

        let response = self
            .client
            .get(self.url(&format!("collections/{}", name)))
            .send()
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(format!("collection '{}': {}", name, e)))?;
        if !response.status().is_success() {
            return Err(RetrievalError::IndexUnavailable(format!(
                "collection '{}' lookup returned {}",
                name,
                response.status()
            )));
        }
        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| RetrievalError::QueryError(format!("collection '{}': {}", name, e)))?;

        self.collection_ids
            .write()
            .insert(name.to_string(), info.id.clone());
        Ok(info.id)
    }

    async fn query_collection(
        &self,
        name: &str,
        embedding: &Embedding,
        limit: usize,
    ) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        let id = self.collection_id(name).await?;
        let request = QueryRequest {
            query_embeddings: [&embedding.vector],
            n_results: limit,
            include: ["documents", "metadatas", "distances"],
        };

        let response = self
            .client
            .post(self.url(&format!("collections/{}/query", id)))
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(format!("collection '{}': {}", name, e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::QueryError(format!(
                "collection '{}' query returned {}: {}",
                name, status, body
            )));
        }
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::QueryError(format!("collection '{}': {}", name, e)))?;

        Ok(to_snippets(name, parsed))
    }
}

fn to_snippets(collection: &str, response: QueryResponse) -> Vec<CandidateSnippet> {
    let ids = response.ids.into_iter().next().unwrap_or_default();
    let mut documents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default()
        .into_iter();
    let mut metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default()
        .into_iter();
    let mut distances = response
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default()
        .into_iter();

    ids.into_iter()
        .map(|id| {
            let text = documents.next().flatten().unwrap_or_default();
            let metadata = metadatas
                .next()
                .flatten()
                .map(|m| SnippetMetadata::from_json_map(&m))
                .unwrap_or_default();
            let score = distances.next().map(distance_to_similarity).unwrap_or(0.0);
            CandidateSnippet::new(id, collection, text, Origin::Vector, score).with_metadata(metadata)
        })
        .collect()
}

#[async_trait]
impl VectorSearch for ChromaVectorSearch {
    fn id(&self) -> &str {
        "chroma"
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
        if limit == 0 || self.config.collections.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = join_all(
            self.config
                .collections
                .iter()
                .map(|name| self.query_collection(name, &embedding, limit)),
        )
        .await;

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in self.config.collections.iter().zip(outcomes) {
            match outcome {
                Ok(snippets) => {
                    debug!(collection = %name, hits = snippets.len(), "Chroma collection searched");
                    results.extend(snippets);
                }
                Err(e) => {
                    warn!(collection = %name, error = %e, "Skipping collection");
                    failures.push(e.to_string());
                }
            }
        }

        if failures.len() == self.config.collections.len() {
            return Err(RetrievalError::IndexUnavailable(format!(
                "all collections failed: {}",
                failures.join("; ")
            )));
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
#[path = "chroma_tests.rs"]
mod tests;
