//! Builds the orchestrator and its collaborators from configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};

use contexta_classifier_zeroshot::{EmbeddingZeroShotBackend, HttpZeroShotBackend};
use contexta_config::{
    ClassifierBackendKind, Config, ConfigLoader, EmbeddingProviderKind, VectorBackendKind,
};
use contexta_protocols::{
    ClassificationBackend, EmbeddingProvider, KeywordSearch, LabelSet, VectorSearch,
};
use contexta_provider_openai::{OpenAISynthesis, OpenAISynthesisConfig};
use contexta_retrieval_keyword::Fts5KeywordSearch;
use contexta_retrieval_vector::{
    ChromaConfig, ChromaVectorSearch, MemoryVectorSearch, OpenAIEmbedding, OpenAIEmbeddingConfig,
    SimpleHashEmbedding,
};
use contexta_runtime::{
    AnswerComposer, Classifier, ClassifierConfig, ComposerConfig, Fuser, FusionConfig,
    Orchestrator, OrchestratorConfig, PromptLimits, RouterRules, ToolRouter,
};
use contexta_tools_sports::{SportsToolClient, SportsToolConfig};

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Treat blank secrets like missing ones.
fn secret(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn embedding_provider(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let embedding = &config.retrieval.embedding;
    Ok(match embedding.provider {
        EmbeddingProviderKind::Hash => Arc::new(SimpleHashEmbedding::new(embedding.dimension)),
        EmbeddingProviderKind::OpenAI => {
            let Some(api_key) = secret(&embedding.api_key) else {
                bail!("retrieval.embedding.api_key is required for the openai embedding provider");
            };
            Arc::new(OpenAIEmbedding::new(
                OpenAIEmbeddingConfig::new(api_key)
                    .with_base_url(embedding.base_url.clone())
                    .with_model(embedding.model.clone())
                    .with_dimension(embedding.dimension)
                    .with_timeout(millis(config.retrieval.vector_timeout_ms)),
            ))
        }
    })
}

async fn keyword_search(config: &Config) -> anyhow::Result<Arc<dyn KeywordSearch>> {
    let path = PathBuf::from(ConfigLoader::expand_path(&config.retrieval.keyword.index_path));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating keyword index directory {}", parent.display()))?;
    }
    let index = Fts5KeywordSearch::open(&path)
        .await
        .with_context(|| format!("opening keyword index {}", path.display()))?;
    info!(path = %path.display(), "Keyword index opened");
    Ok(Arc::new(index))
}

fn vector_search(config: &Config, embedding: Arc<dyn EmbeddingProvider>) -> Arc<dyn VectorSearch> {
    let vector = &config.retrieval.vector;
    match vector.backend {
        VectorBackendKind::Chroma => {
            info!(url = %vector.url, collections = vector.collections.len(), "Using Chroma vector index");
            Arc::new(ChromaVectorSearch::new(
                ChromaConfig {
                    base_url: vector.url.clone(),
                    collections: vector.collections.clone(),
                    timeout: millis(config.retrieval.vector_timeout_ms),
                },
                embedding,
            ))
        }
        VectorBackendKind::Memory => {
            info!("Using in-memory vector index");
            Arc::new(MemoryVectorSearch::new(embedding))
        }
    }
}

fn classifier(config: &Config, embedding: Arc<dyn EmbeddingProvider>) -> Classifier {
    let settings = &config.classifier;
    let backend: Arc<dyn ClassificationBackend> = match settings.backend {
        ClassifierBackendKind::Http => {
            let mut backend = HttpZeroShotBackend::new(settings.endpoint.clone())
                .with_timeout(millis(settings.timeout_ms));
            if let Some(key) = secret(&settings.api_key) {
                backend = backend.with_api_key(key);
            }
            Arc::new(backend)
        }
        ClassifierBackendKind::Embedding => Arc::new(EmbeddingZeroShotBackend::new(embedding)),
    };

    Classifier::with_config(
        backend,
        LabelSet::new(settings.labels.iter().cloned()),
        ClassifierConfig {
            threshold: settings.threshold,
            max_concurrency: settings.max_concurrency,
            timeout: millis(settings.timeout_ms),
            max_input_chars: settings.max_input_chars,
        },
    )
}

fn composer(config: &Config) -> AnswerComposer {
    let synthesis = &config.synthesis;
    let composer = match secret(&synthesis.api_key) {
        Some(api_key) => AnswerComposer::new(Arc::new(OpenAISynthesis::new(
            OpenAISynthesisConfig::new(api_key)
                .with_base_url(synthesis.base_url.clone())
                .with_model(synthesis.model.clone())
                .with_timeout(millis(synthesis.timeout_ms)),
        ))),
        None => {
            warn!("No synthesis API key configured; answers will list retrieved documents only");
            AnswerComposer::without_synthesis()
        }
    };

    composer.with_config(ComposerConfig {
        limits: PromptLimits {
            top_n: config.composer.top_n,
            snippet_chars: config.composer.snippet_chars,
            context_budget_chars: config.composer.context_budget_chars,
            live_items: config.composer.live_items,
        },
        max_tokens: Some(synthesis.max_tokens),
        temperature: Some(synthesis.temperature),
        timeout: millis(synthesis.timeout_ms),
    })
}

/// Orchestrator settings derived from configuration.
///
/// The tool guard covers a retried call: two attempts plus a second of slack.
pub(crate) fn orchestrator_config(config: &Config) -> OrchestratorConfig {
    OrchestratorConfig {
        keyword_limit: config.retrieval.keyword_limit,
        vector_limit: config.retrieval.vector_limit,
        keyword_timeout: millis(config.retrieval.keyword_timeout_ms),
        vector_timeout: millis(config.retrieval.vector_timeout_ms),
        tool_timeout: millis(config.tools.timeout_ms.saturating_mul(2).saturating_add(1000)),
        deadline: config.pipeline.deadline_ms.map(millis),
    }
}

pub(crate) async fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let embedding = embedding_provider(config)?;
    let keyword = keyword_search(config).await?;
    let vector = vector_search(config, embedding.clone());

    let mut orchestrator = Orchestrator::new(
        keyword,
        vector,
        classifier(config, embedding),
        composer(config),
    )
    .with_config(orchestrator_config(config))
    .with_fuser(Fuser::new(FusionConfig {
        vector_weight: config.fusion.vector_weight,
        keyword_weight: config.fusion.keyword_weight,
        max_results: config.fusion.max_results,
    }))
    .with_router(ToolRouter::new(RouterRules {
        known_teams: config.router.known_teams.clone(),
        sports_keywords: config.router.sports_keywords.clone(),
        trigger_labels: config.router.trigger_labels.clone(),
    }));

    if config.tools.enabled {
        info!(url = %config.tools.base_url, "Sports tool enabled");
        orchestrator = orchestrator.with_tool_client(Arc::new(SportsToolClient::new(SportsToolConfig {
            base_url: config.tools.base_url.clone(),
            timeout: millis(config.tools.timeout_ms),
            max_in_flight: config.tools.max_in_flight,
            retry_on_unavailable: config.tools.retry_on_unavailable,
        })));
    } else {
        info!("Sports tool disabled");
    }

    Ok(orchestrator)
}
