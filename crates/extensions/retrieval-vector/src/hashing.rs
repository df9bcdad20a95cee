//! Offline feature-hashing embeddings.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use contexta_protocols::{Embedding, EmbeddingError, EmbeddingProvider};

/// Each lowercase token adds a signed unit to one bucket, then the vector is
/// unit-normalized. Texts sharing words land close; no network needed.
pub struct SimpleHashEmbedding {
    dimension: usize,
}

impl SimpleHashEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    fn project(&self, text: &str) -> Embedding {
        let mut buckets = vec![0.0f32; self.dimension];
        for token in Self::tokens(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let digest = hasher.finish();
            let slot = (digest % self.dimension as u64) as usize;
            buckets[slot] += if digest >> 63 == 0 { 1.0 } else { -1.0 };
        }

        let embedding = Embedding::new(buckets);
        let norm = embedding.l2_norm();
        if norm == 0.0 {
            return embedding;
        }
        Embedding::new(embedding.vector.into_iter().map(|v| v / norm).collect())
    }
}

impl Default for SimpleHashEmbedding {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for SimpleHashEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self.project(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.project(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_case_and_punctuation_insensitive() {
        let provider = SimpleHashEmbedding::new(64);
        let a = provider.embed("Lakers beat Celtics").await.unwrap();
        let b = provider.embed("lakers BEAT celtics!").await.unwrap();
        assert_eq!(a.dimension, 64);
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_words_score_closer() {
        let provider = SimpleHashEmbedding::default();
        let query = provider.embed("Lakers game tonight").await.unwrap();
        let related = provider.embed("The Lakers game starts tonight at eight").await.unwrap();
        let unrelated = provider.embed("Camera calibration checklist").await.unwrap();
        assert!(query.cosine_similarity(&related) > query.cosine_similarity(&unrelated));
    }

    #[tokio::test]
    async fn test_output_is_unit_length_or_zero() {
        let provider = SimpleHashEmbedding::new(32);
        let text = provider.embed("encoder bitrate settings").await.unwrap();
        assert!((text.l2_norm() - 1.0).abs() < 1e-5);

        let empty = provider.embed("").await.unwrap();
        assert!(empty.vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_clamped() {
        assert_eq!(SimpleHashEmbedding::new(0).dimension(), 1);
    }
}
