//! The assistant response returned to callers.

use serde::{Deserialize, Serialize};

use crate::classification::Classification;
use crate::fused::FusedResultSet;
use crate::tool::ToolResponse;

/// A partial failure that degraded the response without failing the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    KeywordSearchUnavailable,
    KeywordSearchTimedOut,
    VectorSearchUnavailable,
    VectorSearchTimedOut,
    ClassificationUnavailable,
    LiveDataUnavailable,
    SynthesisUnavailable,
}

/// Final output of one query. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub query_id: String,
    pub query: String,
    pub answer: String,
    pub snippets: FusedResultSet,
    pub classification: Classification,
    pub tool_response: Option<ToolResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
}

impl AssistantResponse {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn has(&self, degradation: Degradation) -> bool {
        self.degradations.contains(&degradation)
    }

    /// Whether live tool data made it into the response.
    pub fn has_live_data(&self) -> bool {
        self.tool_response
            .as_ref()
            .is_some_and(ToolResponse::is_success)
    }
}
