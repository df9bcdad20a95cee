//! Configuration validation.

use std::fmt;

use crate::error::ConfigError;
use crate::schema::{ClassifierBackendKind, Config, EmbeddingProviderKind, VectorBackendKind};

/// One problem found in a config, addressed by its dotted key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors make the config unusable; warnings are logged at startup.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(Issue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(Issue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn require_positive(&mut self, path: &str, value: u64) {
        if value == 0 {
            self.error(path, "must be greater than 0");
        }
    }

    /// Fail on the first error, otherwise hand back the warnings.
    pub fn into_result(self) -> Result<Vec<Issue>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(issue) => Err(ConfigError::InvalidValue {
                field: issue.path,
                message: issue.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_retrieval(config, &mut result);
        Self::validate_fusion(config, &mut result);
        Self::validate_classifier(config, &mut result);
        Self::validate_router(config, &mut result);
        Self::validate_tools(config, &mut result);
        Self::validate_synthesis(config, &mut result);
        Self::validate_composer(config, &mut result);
        Self::validate_pipeline(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        result.require_positive("server.port", u64::from(config.server.port));
        if config.server.host.trim().is_empty() {
            result.error("server.host", "must not be empty");
        }
    }

    fn validate_retrieval(config: &Config, result: &mut ValidationResult) {
        let retrieval = &config.retrieval;

        result.require_positive("retrieval.keyword_limit", retrieval.keyword_limit as u64);
        result.require_positive("retrieval.vector_limit", retrieval.vector_limit as u64);
        result.require_positive("retrieval.keyword_timeout_ms", retrieval.keyword_timeout_ms);
        result.require_positive("retrieval.vector_timeout_ms", retrieval.vector_timeout_ms);
        result.require_positive("retrieval.embedding.dimension", retrieval.embedding.dimension as u64);

        if retrieval.vector.backend == VectorBackendKind::Chroma {
            if !is_http_url(&retrieval.vector.url) {
                result.error("retrieval.vector.url", "must start with http:// or https://");
            }
            if retrieval.vector.collections.is_empty() {
                result.error("retrieval.vector.collections", "at least one collection is required");
            }
        }

        if retrieval.embedding.provider == EmbeddingProviderKind::OpenAI
            && retrieval.embedding.api_key.is_none()
        {
            result.error(
                "retrieval.embedding.api_key",
                "the openai embedding provider needs an API key",
            );
        }
    }

    fn validate_fusion(config: &Config, result: &mut ValidationResult) {
        let fusion = &config.fusion;

        if fusion.vector_weight < 0.0 || fusion.keyword_weight < 0.0 {
            result.error("fusion", "weights must not be negative");
        } else if fusion.vector_weight == 0.0 && fusion.keyword_weight == 0.0 {
            result.error("fusion", "at least one weight must be positive");
        }

        if fusion.max_results == Some(0) {
            result.warn("fusion.max_results", "0 discards every retrieved snippet");
        }
    }

    fn validate_classifier(config: &Config, result: &mut ValidationResult) {
        let classifier = &config.classifier;

        if !(0.0..=1.0).contains(&classifier.threshold) {
            result.error("classifier.threshold", "must be within [0, 1]");
        }
        result.require_positive("classifier.max_concurrency", classifier.max_concurrency as u64);
        result.require_positive("classifier.timeout_ms", classifier.timeout_ms);
        result.require_positive("classifier.max_input_chars", classifier.max_input_chars as u64);

        if classifier.max_concurrency > 64 {
            result.warn(
                "classifier.max_concurrency",
                "above 64, the classification backend may be overloaded",
            );
        }
        if classifier.labels.iter().all(|l| l.trim().is_empty()) {
            result.warn("classifier.labels", "empty, every snippet will be unclassified");
        }
        if classifier.backend == ClassifierBackendKind::Http {
            if !is_http_url(&classifier.endpoint) {
                result.error("classifier.endpoint", "must start with http:// or https://");
            }
            if classifier.api_key.is_none() {
                result.warn("classifier.api_key", "not set, hosted inference may reject requests");
            }
        }
    }

    fn validate_router(config: &Config, result: &mut ValidationResult) {
        for label in &config.router.trigger_labels {
            if !config.classifier.labels.contains(label) {
                result.warn(
                    "router.trigger_labels",
                    format!("'{}' is not in classifier.labels and can never fire", label),
                );
            }
        }
    }

    fn validate_tools(config: &Config, result: &mut ValidationResult) {
        let tools = &config.tools;
        if !tools.enabled {
            return;
        }

        if !is_http_url(&tools.base_url) {
            result.error("tools.base_url", "must start with http:// or https://");
        }
        result.require_positive("tools.timeout_ms", tools.timeout_ms);
        result.require_positive("tools.max_in_flight", tools.max_in_flight as u64);
    }

    fn validate_synthesis(config: &Config, result: &mut ValidationResult) {
        let synthesis = &config.synthesis;

        if synthesis.api_key.is_none() {
            result.warn("synthesis.api_key", "not set, answers will be returned in degraded form");
        }
        if !is_http_url(&synthesis.base_url) {
            result.error("synthesis.base_url", "must start with http:// or https://");
        }
        if !(0.0..=2.0).contains(&synthesis.temperature) {
            result.error("synthesis.temperature", "must be within [0, 2]");
        }
        result.require_positive("synthesis.timeout_ms", synthesis.timeout_ms);
    }

    fn validate_composer(config: &Config, result: &mut ValidationResult) {
        let composer = &config.composer;

        if composer.top_n == 0 {
            result.warn("composer.top_n", "0 sends no document context to synthesis");
        }
        if composer.context_budget_chars < composer.snippet_chars {
            result.warn(
                "composer.context_budget_chars",
                "smaller than a single snippet, context will always be empty",
            );
        }
    }

    fn validate_pipeline(config: &Config, result: &mut ValidationResult) {
        if config.pipeline.deadline_ms == Some(0) {
            result.error("pipeline.deadline_ms", "must be greater than 0 when set");
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
