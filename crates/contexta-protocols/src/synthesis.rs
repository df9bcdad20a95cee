//! Synthesis capability: prompt in, text out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// A request to synthesize the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// System-level instructions.
    pub instructions: String,
    /// Rendered context, including the query.
    pub context: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl SynthesisRequest {
    pub fn new(
        instructions: impl Into<String>,
        context: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            context: context.into(),
            query: query.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Black-box answer generation.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Provider identifier used in logs.
    fn id(&self) -> &str;

    async fn synthesize(&self, request: SynthesisRequest) -> Result<String, SynthesisError>;
}
