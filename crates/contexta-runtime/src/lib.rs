//! # Contexta Runtime
//!
//! The query orchestration pipeline: result fusion, zero-shot
//! classification, tool routing, answer composition and the orchestrator
//! that sequences them.

pub mod classifier;
pub mod composer;
pub mod fusion;
pub mod orchestrator;
pub mod prompt;
pub mod router;
pub mod stage;

pub use classifier::{retain_labels, ClassificationRun, Classifier, ClassifierConfig};
pub use composer::{AnswerComposer, ComposerConfig, DEGRADED_ANSWER};
pub use fusion::{min_max_normalize, Fuser, FusionConfig};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use prompt::{
    render_context, render_live_data, truncate_text, PromptLimits, RenderedContext,
    SYSTEM_INSTRUCTIONS,
};
pub use router::{extract_entity, EventWindow, RouteRule, RouterRules, ToolRouter};
pub use stage::PipelineStage;

// Re-exported so callers can cancel queries without a direct dependency.
pub use tokio_util::sync::CancellationToken;
