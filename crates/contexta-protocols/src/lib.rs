//! # Contexta Protocols
//!
//! Core types and collaborator traits for the contexta query pipeline.
//! Contains only interface definitions - no implementations.
//!
//! ## Collaborator Traits
//!
//! - [`KeywordSearch`] - Sparse full-text retrieval
//! - [`VectorSearch`] - Dense similarity retrieval
//! - [`EmbeddingProvider`] - Text to vector conversion
//! - [`ClassificationBackend`] - Zero-shot label scoring
//! - [`ToolClient`] - External data tool invocation
//! - [`SynthesisProvider`] - Final answer generation

pub mod classification;
pub mod embedding;
pub mod error;
pub mod fused;
pub mod query;
pub mod response;
pub mod retrieval;
pub mod snippet;
pub mod synthesis;
pub mod tool;

pub use classification::{
    Classification, ClassificationBackend, LabelScore, LabelSet, DEFAULT_LABELS,
};
pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{
    ClassifierError, EmbeddingError, PipelineError, RetrievalError, SynthesisError, ToolError,
};
pub use fused::{FusedResultSet, FusedSnippet};
pub use query::Query;
pub use response::{AssistantResponse, Degradation};
pub use retrieval::{KeywordSearch, VectorQuery, VectorSearch, DEFAULT_SEARCH_LIMIT};
pub use snippet::{CandidateSnippet, MetadataValue, Origin, SnippetMetadata};
pub use synthesis::{SynthesisProvider, SynthesisRequest};
pub use tool::{
    EventStatus, SportsEntity, SportsEvent, SportsSearchPayload, TeamEventsPayload, TeamInfo,
    ToolClient, ToolFailure, ToolFailureKind, ToolOutcome, ToolParamValue, ToolPayload,
    ToolRequest, ToolResponse, LATEST_EVENTS, SPORTS_SEARCH,
};
