//! Embedding-similarity zero-shot backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use contexta_protocols::{
    ClassificationBackend, ClassifierError, Embedding, EmbeddingProvider, LabelScore, LabelSet,
};

/// Scores each label as the cosine similarity between the text and the
/// label, clamped to [0, 1]. Label embeddings are cached.
pub struct EmbeddingZeroShotBackend {
    provider: Arc<dyn EmbeddingProvider>,
    label_cache: RwLock<HashMap<String, Embedding>>,
}

impl EmbeddingZeroShotBackend {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            label_cache: RwLock::new(HashMap::new()),
        }
    }

    async fn label_embeddings(&self, labels: &LabelSet) -> Result<Vec<Embedding>, ClassifierError> {
        let missing: Vec<&str> = {
            let cache = self.label_cache.read();
            labels
                .labels()
                .iter()
                .filter(|l| !cache.contains_key(l.as_str()))
                .map(String::as_str)
                .collect()
        };

        if !missing.is_empty() {
            let embedded = self
                .provider
                .embed_batch(&missing)
                .await
                .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;
            let mut cache = self.label_cache.write();
            for (label, embedding) in missing.iter().zip(embedded) {
                cache.insert(label.to_string(), embedding);
            }
        }

        let cache = self.label_cache.read();
        labels
            .labels()
            .iter()
            .map(|l| {
                cache.get(l).cloned().ok_or_else(|| {
                    ClassifierError::InvalidResponse(format!("no embedding for label '{}'", l))
                })
            })
            .collect()
    }
}

#[async_trait]
impl ClassificationBackend for EmbeddingZeroShotBackend {
    fn id(&self) -> &str {
        "zero-shot-embedding"
    }

    async fn score(&self, text: &str, labels: &LabelSet) -> Result<Vec<LabelScore>, ClassifierError> {
        let label_embeddings = self.label_embeddings(labels).await?;
        let text_embedding = self
            .provider
            .embed(text)
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        Ok(labels
            .labels()
            .iter()
            .zip(&label_embeddings)
            .map(|(label, embedding)| {
                let similarity = text_embedding.cosine_similarity(embedding);
                LabelScore::new(label.clone(), similarity.clamp(0.0, 1.0))
            })
            .collect())
    }
}
