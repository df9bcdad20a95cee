//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use contexta_protocols::DEFAULT_LABELS;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub fusion: FusionSettings,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub composer: ComposerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8002
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub directory: String,

    /// Write JSON lines to the log file instead of text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_dir(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.contexta/logs".to_string()
}

/// Retrieval adapters configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,

    #[serde(default = "default_vector_limit")]
    pub vector_limit: usize,

    #[serde(default = "default_retrieval_timeout")]
    pub keyword_timeout_ms: u64,

    #[serde(default = "default_retrieval_timeout")]
    pub vector_timeout_ms: u64,

    #[serde(default)]
    pub keyword: KeywordIndexConfig,

    #[serde(default)]
    pub vector: VectorIndexConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            keyword_limit: default_keyword_limit(),
            vector_limit: default_vector_limit(),
            keyword_timeout_ms: default_retrieval_timeout(),
            vector_timeout_ms: default_retrieval_timeout(),
            keyword: KeywordIndexConfig::default(),
            vector: VectorIndexConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

fn default_keyword_limit() -> usize {
    10
}

fn default_vector_limit() -> usize {
    5
}

fn default_retrieval_timeout() -> u64 {
    3000
}

/// Keyword (FTS5) index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordIndexConfig {
    #[serde(default = "default_index_path")]
    pub index_path: String,
}

impl Default for KeywordIndexConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
        }
    }
}

fn default_index_path() -> String {
    "~/.contexta/keyword_index.db".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackendKind {
    #[default]
    Chroma,
    Memory,
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    #[serde(default)]
    pub backend: VectorBackendKind,

    #[serde(default = "default_chroma_url")]
    pub url: String,

    #[serde(default = "default_collections")]
    pub collections: Vec<String>,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackendKind::default(),
            url: default_chroma_url(),
            collections: default_collections(),
        }
    }
}

fn default_chroma_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_collections() -> Vec<String> {
    [
        "broadcast_transcripts",
        "production_metadata",
        "technical_docs",
        "industry_news",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    #[default]
    Hash,
    OpenAI,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    384
}

/// Fusion weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionSettings {
    #[serde(default = "default_weight")]
    pub vector_weight: f32,

    #[serde(default = "default_weight")]
    pub keyword_weight: f32,

    /// Optional cap on the fused set size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            vector_weight: default_weight(),
            keyword_weight: default_weight(),
            max_results: None,
        }
    }
}

fn default_weight() -> f32 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackendKind {
    Http,
    #[default]
    Embedding,
}

/// Zero-shot classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackendKind,

    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default = "default_classifier_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackendKind::default(),
            endpoint: default_classifier_endpoint(),
            api_key: None,
            labels: default_labels(),
            threshold: default_threshold(),
            max_concurrency: default_classifier_concurrency(),
            timeout_ms: default_classifier_timeout(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli".to_string()
}

fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
}

fn default_threshold() -> f32 {
    0.3
}

fn default_classifier_concurrency() -> usize {
    5
}

fn default_classifier_timeout() -> u64 {
    5000
}

fn default_max_input_chars() -> usize {
    1024
}

/// Tool routing rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Team names matched verbatim in the query; highest precedence.
    #[serde(default = "default_known_teams")]
    pub known_teams: Vec<String>,

    #[serde(default = "default_sports_keywords")]
    pub sports_keywords: Vec<String>,

    /// Labels that trigger routing when present in the classification.
    #[serde(default = "default_trigger_labels")]
    pub trigger_labels: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            known_teams: default_known_teams(),
            sports_keywords: default_sports_keywords(),
            trigger_labels: default_trigger_labels(),
        }
    }
}

fn default_known_teams() -> Vec<String> {
    [
        "Lakers",
        "Celtics",
        "Warriors",
        "Bulls",
        "Knicks",
        "Heat",
        "Yankees",
        "Dodgers",
        "Red Sox",
        "Patriots",
        "Cowboys",
        "Arsenal",
        "Chelsea",
        "Liverpool",
        "Manchester United",
        "Manchester City",
        "Real Madrid",
        "Barcelona",
        "Bayern Munich",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sports_keywords() -> Vec<String> {
    [
        "score",
        "game",
        "games",
        "match",
        "team",
        "player",
        "sport",
        "league",
        "championship",
        "tournament",
        "win",
        "lose",
        "play",
        "coach",
        "stadium",
        "last night",
        "yesterday",
        "upcoming",
        "schedule",
        "roster",
        "lineup",
        "stats",
        "statistics",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_trigger_labels() -> Vec<String> {
    vec!["sports".to_string(), "sports news".to_string()]
}

/// External tool service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tools_url")]
    pub base_url: String,

    #[serde(default = "default_tools_timeout")]
    pub timeout_ms: u64,

    /// Shared cap on in-flight calls across all queries.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_true")]
    pub retry_on_unavailable: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_tools_url(),
            timeout_ms: default_tools_timeout(),
            max_in_flight: default_max_in_flight(),
            retry_on_unavailable: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tools_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_tools_timeout() -> u64 {
    5000
}

fn default_max_in_flight() -> usize {
    8
}

/// Synthesis (chat completions) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_synthesis_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_synthesis_timeout")]
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_synthesis_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_synthesis_timeout(),
        }
    }
}

fn default_synthesis_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    150
}

fn default_synthesis_timeout() -> u64 {
    15_000
}

/// Answer composer limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    #[serde(default = "default_context_budget")]
    pub context_budget_chars: usize,

    /// Items per live-data list (search hits, results, fixtures).
    #[serde(default = "default_live_items")]
    pub live_items: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            snippet_chars: default_snippet_chars(),
            context_budget_chars: default_context_budget(),
            live_items: default_live_items(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_snippet_chars() -> usize {
    200
}

fn default_context_budget() -> usize {
    4000
}

fn default_live_items() -> usize {
    3
}

/// Whole-query settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Overall deadline for one query; unset means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8002);
        assert_eq!(config.retrieval.keyword_limit, 10);
        assert_eq!(config.retrieval.vector.collections.len(), 4);
        assert_eq!(config.retrieval.vector.backend, VectorBackendKind::Chroma);
        assert_eq!(config.classifier.labels.len(), 6);
        assert_eq!(config.classifier.threshold, 0.3);
        assert_eq!(config.synthesis.model, "gpt-3.5-turbo");
        assert_eq!(config.synthesis.max_tokens, 150);
        assert!(config.tools.retry_on_unavailable);
        assert!(config.pipeline.deadline_ms.is_none());
    }

    #[test]
    fn test_backend_kinds_parse() {
        let config: Config = toml::from_str(
            r#"
            [retrieval.vector]
            backend = "memory"

            [retrieval.embedding]
            provider = "openai"

            [classifier]
            backend = "http"
            "#,
        )
        .unwrap();
        assert_eq!(config.retrieval.vector.backend, VectorBackendKind::Memory);
        assert_eq!(config.retrieval.embedding.provider, EmbeddingProviderKind::OpenAI);
        assert_eq!(config.classifier.backend, ClassifierBackendKind::Http);
    }

    #[test]
    fn test_router_defaults_include_original_keywords() {
        let router = RouterConfig::default();
        assert!(router.known_teams.iter().any(|t| t == "Lakers"));
        assert!(router.sports_keywords.iter().any(|k| k == "last night"));
        assert!(router.trigger_labels.iter().any(|l| l == "sports"));
    }

    #[test]
    fn test_serialize_roundtrip_keeps_values() {
        let mut config = Config::default();
        config.fusion.max_results = Some(12);
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.fusion.max_results, Some(12));
    }
}
