//! Dense retrieval for contexta.
//!
//! ## Embedding providers
//!
//! - [`SimpleHashEmbedding`] - deterministic feature hashing, no network
//! - [`OpenAIEmbedding`] - OpenAI-compatible `/embeddings` endpoint
//!
//! ## Vector search adapters
//!
//! - [`MemoryVectorSearch`] - brute-force cosine search over an in-process index
//! - [`ChromaVectorSearch`] - Chroma HTTP API, fanned out over several collections

mod chroma;
mod hashing;
mod memory;
mod openai;

pub use chroma::{distance_to_similarity, ChromaConfig, ChromaVectorSearch};
pub use hashing::SimpleHashEmbedding;
pub use memory::MemoryVectorSearch;
pub use openai::{OpenAIEmbedding, OpenAIEmbeddingConfig};
