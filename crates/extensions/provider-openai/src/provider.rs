//! OpenAI synthesis provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use contexta_protocols::{SynthesisError, SynthesisProvider, SynthesisRequest};

use crate::api::{error_message, ApiMessage, ApiRequest, ApiResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAISynthesisConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAISynthesisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat-completions backed [`SynthesisProvider`].
pub struct OpenAISynthesis {
    config: OpenAISynthesisConfig,
    client: reqwest::Client,
}

impl OpenAISynthesis {
    pub fn new(config: OpenAISynthesisConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, request: SynthesisRequest) -> ApiRequest {
        ApiRequest {
            model: self.config.model.clone(),
            messages: vec![
                ApiMessage::system(request.instructions),
                ApiMessage::user(request.context),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, SynthesisError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    SynthesisError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ApiError {
                status,
                message: error_message(&text),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SynthesisProvider for OpenAISynthesis {
    fn id(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<String, SynthesisError> {
        let api_request = self.build_request(request);
        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &api_response.usage {
            debug!(
                model = api_response.model.as_deref().unwrap_or(&self.config.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Synthesis complete"
            );
        }

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SynthesisError::InvalidResponse("no choices".to_string()))?;
        let answer = choice
            .message
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(SynthesisError::InvalidResponse(format!(
                "empty answer (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(answer)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
