//! Hosted zero-shot inference backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use contexta_protocols::{ClassificationBackend, ClassifierError, LabelScore, LabelSet};

/// Hugging Face inference endpoint for `facebook/bart-large-mnli`.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// Some deployments wrap the single output in a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Single(InferenceOutput),
    Batch(Vec<InferenceOutput>),
}

/// Zero-shot classification over HTTP.
pub struct HttpZeroShotBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpZeroShotBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Client-side request timeout; the classifier applies its own guard too.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpZeroShotBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl ClassificationBackend for HttpZeroShotBackend {
    fn id(&self) -> &str {
        "zero-shot-http"
    }

    async fn score(&self, text: &str, labels: &LabelSet) -> Result<Vec<LabelScore>, ClassifierError> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                candidate_labels: labels.labels(),
                multi_label: true,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Unavailable(format!("HTTP {}: {}", status, body)));
        }

        let output = match response
            .json::<InferenceResponse>()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?
        {
            InferenceResponse::Single(output) => output,
            InferenceResponse::Batch(outputs) => outputs
                .into_iter()
                .next()
                .ok_or_else(|| ClassifierError::InvalidResponse("empty output list".to_string()))?,
        };

        if output.labels.len() != output.scores.len() {
            return Err(ClassifierError::InvalidResponse(format!(
                "{} labels but {} scores",
                output.labels.len(),
                output.scores.len()
            )));
        }

        debug!(labels = output.labels.len(), "Zero-shot inference complete");
        Ok(output
            .labels
            .into_iter()
            .zip(output.scores)
            .map(|(label, score)| LabelScore::new(label, score.clamp(0.0, 1.0)))
            .collect())
    }
}
