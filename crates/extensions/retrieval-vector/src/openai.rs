//! OpenAI-compatible `/embeddings` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use contexta_protocols::{Embedding, EmbeddingError, EmbeddingProvider};

#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without the `/embeddings` suffix.
    pub base_url: String,
    pub dimension: usize,
    pub timeout: Duration,
}

impl OpenAIEmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            dimension: 1536,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Prefer the API's `{"error": {"message"}}` text over the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Embeddings from an OpenAI-compatible API.
pub struct OpenAIEmbedding {
    client: reqwest::Client,
    config: OpenAIEmbeddingConfig,
}

impl OpenAIEmbedding {
    pub fn new(config: OpenAIEmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn config(&self) -> &OpenAIEmbeddingConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::InvalidInput("cannot embed blank text".to_string()));
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                input: texts,
                model: &self.config.model,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        let mut rows = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?
            .data;
        if rows.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "sent {} texts, received {} embeddings",
                texts.len(),
                rows.len()
            )));
        }
        rows.sort_by_key(|row| row.index.unwrap_or(usize::MAX));

        debug!(count = rows.len(), model = %self.config.model, "Embedded batch");
        Ok(rows.into_iter().map(|row| Embedding::new(row.embedding)).collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
