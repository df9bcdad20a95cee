//! Answer composition: context rendering, synthesis and response assembly.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use contexta_protocols::{
    AssistantResponse, Classification, Degradation, FusedResultSet, Query, SynthesisError,
    SynthesisProvider, SynthesisRequest, ToolResponse,
};

use crate::prompt::{render_context, truncate_text, PromptLimits, SYSTEM_INSTRUCTIONS};

/// Answer text prefix used when synthesis is unavailable.
pub const DEGRADED_ANSWER: &str = "I'm sorry, I couldn't generate a response at this time.";

/// Composer settings.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub limits: PromptLimits,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Guard around the synthesis call.
    pub timeout: Duration,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            limits: PromptLimits::default(),
            max_tokens: Some(150),
            temperature: Some(0.7),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Builds the final [`AssistantResponse`] for a query.
pub struct AnswerComposer {
    provider: Option<Arc<dyn SynthesisProvider>>,
    config: ComposerConfig,
}

impl AnswerComposer {
    pub fn new(provider: Arc<dyn SynthesisProvider>) -> Self {
        Self {
            provider: Some(provider),
            config: ComposerConfig::default(),
        }
    }

    /// A composer with no synthesis capability; every answer is degraded.
    pub fn without_synthesis() -> Self {
        Self {
            provider: None,
            config: ComposerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn has_synthesis(&self) -> bool {
        self.provider.is_some()
    }

    /// Compose the response. Synthesis failures never raise; they produce
    /// a degraded answer and a [`Degradation::SynthesisUnavailable`] marker.
    pub async fn compose(
        &self,
        query: &Query,
        fused: FusedResultSet,
        classification: Classification,
        tool_response: Option<ToolResponse>,
        mut degradations: Vec<Degradation>,
    ) -> AssistantResponse {
        if tool_response.as_ref().is_some_and(|r| !r.is_success()) {
            degradations.push(Degradation::LiveDataUnavailable);
        }

        let rendered = render_context(
            query,
            &fused,
            &classification,
            tool_response.as_ref(),
            &self.config.limits,
        );
        debug!(
            query_id = query.id(),
            snippets_used = rendered.snippets_used,
            context_chars = rendered.text.len(),
            "Rendered synthesis context"
        );

        let answer = match self.synthesize(query, rendered.text).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(query_id = query.id(), error = %e, "Synthesis failed; returning degraded answer");
                degradations.push(Degradation::SynthesisUnavailable);
                degraded_answer(&fused, tool_response.as_ref(), &self.config.limits)
            }
        };

        degradations.sort();
        degradations.dedup();

        AssistantResponse {
            query_id: query.id().to_string(),
            query: query.text().to_string(),
            answer,
            snippets: fused,
            classification,
            tool_response,
            degradations,
        }
    }

    async fn synthesize(&self, query: &Query, context: String) -> Result<String, SynthesisError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| SynthesisError::Unavailable("no synthesis provider configured".to_string()))?;

        let mut request = SynthesisRequest::new(SYSTEM_INSTRUCTIONS, context, query.text());
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let answer = tokio::time::timeout(self.config.timeout, provider.synthesize(request))
            .await
            .map_err(|_| SynthesisError::Timeout(timeout_ms))??;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(SynthesisError::InvalidResponse("empty answer".to_string()));
        }
        Ok(answer.to_string())
    }
}

/// Answer text explaining the degraded state, listing what was found.
fn degraded_answer(
    fused: &FusedResultSet,
    tool_response: Option<&ToolResponse>,
    limits: &PromptLimits,
) -> String {
    let mut answer = DEGRADED_ANSWER.to_string();
    if fused.is_empty() {
        answer.push_str(" No relevant documents were found.");
    } else {
        answer.push_str(&format!(
            " Here are the {} most relevant documents I found:",
            fused.top(limits.top_n).len()
        ));
        for (i, entry) in fused.top(limits.top_n).iter().enumerate() {
            answer.push_str(&format!(
                "\n{}. {}",
                i + 1,
                truncate_text(entry.snippet.text.trim(), limits.snippet_chars)
            ));
        }
    }
    if tool_response.is_some_and(ToolResponse::is_success) {
        answer.push_str("\nLive sports data is attached to this response.");
    }
    answer
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod tests;
