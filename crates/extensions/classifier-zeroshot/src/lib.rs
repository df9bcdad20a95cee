//! Zero-shot classification backends for contexta.
//!
//! - [`HttpZeroShotBackend`] calls a hosted NLI model (Hugging Face
//!   inference API shape) with every candidate label.
//! - [`EmbeddingZeroShotBackend`] scores labels by embedding similarity and
//!   needs no model server.

mod embedding;
mod http;

pub use embedding::EmbeddingZeroShotBackend;
pub use http::{HttpZeroShotBackend, DEFAULT_ENDPOINT};
