//! Dense vectors shared by vector retrieval and the zero-shot classifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// A dense text embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub dimension: usize,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        let dimension = vector.len();
        Self { vector, dimension }
    }

    pub fn l2_norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity in [-1, 1]. Mismatched dimensions and zero
    /// vectors score 0.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.dimension != other.dimension {
            return 0.0;
        }
        let denominator = self.l2_norm() * other.l2_norm();
        if denominator == 0.0 {
            return 0.0;
        }
        let dot = self
            .vector
            .iter()
            .zip(&other.vector)
            .fold(0.0f32, |acc, (a, b)| acc + a * b);
        dot / denominator
    }
}

/// Turns text into embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Embeds several texts; output order matches input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    fn dimension(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_records_dimension() {
        assert_eq!(Embedding::new(vec![0.1; 384]).dimension, 384);
    }

    #[test]
    fn test_l2_norm() {
        assert!((Embedding::new(vec![3.0, 4.0]).l2_norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_scale_invariant() {
        let query = Embedding::new(vec![1.0, 2.0, 0.0]);
        let doc = Embedding::new(vec![2.0, 4.0, 0.0]);
        assert!((query.cosine_similarity(&doc) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite_is_negative() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![-1.0, 0.0]);
        assert!((a.cosine_similarity(&b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs_score_zero() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.cosine_similarity(&Embedding::new(vec![1.0, 0.0])), 0.0);
        assert_eq!(a.cosine_similarity(&Embedding::new(vec![0.0; 3])), 0.0);
    }
}
