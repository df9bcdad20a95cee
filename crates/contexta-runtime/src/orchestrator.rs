//! The query orchestrator: sequences retrieval, fusion, classification,
//! tool routing and composition for one query at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use contexta_protocols::{
    AssistantResponse, CandidateSnippet, Degradation, KeywordSearch, PipelineError, Query,
    ToolClient, ToolError, ToolRequest, ToolResponse, VectorQuery, VectorSearch,
    DEFAULT_SEARCH_LIMIT,
};

use crate::classifier::Classifier;
use crate::composer::AnswerComposer;
use crate::fusion::Fuser;
use crate::router::ToolRouter;
use crate::stage::PipelineStage;

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub keyword_limit: usize,
    pub vector_limit: usize,
    pub keyword_timeout: Duration,
    pub vector_timeout: Duration,
    /// Guard around the whole tool invocation, retries included.
    pub tool_timeout: Duration,
    /// Optional overall deadline for one query.
    pub deadline: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            keyword_limit: DEFAULT_SEARCH_LIMIT,
            vector_limit: 5,
            keyword_timeout: Duration::from_secs(3),
            vector_timeout: Duration::from_secs(3),
            tool_timeout: Duration::from_secs(11),
            deadline: None,
        }
    }
}

/// Query pipeline entry point.
///
/// Collaborators are shared trait objects; one orchestrator serves any
/// number of concurrent queries.
pub struct Orchestrator {
    keyword: Arc<dyn KeywordSearch>,
    vector: Arc<dyn VectorSearch>,
    fuser: Fuser,
    classifier: Classifier,
    router: ToolRouter,
    tool_client: Option<Arc<dyn ToolClient>>,
    composer: AnswerComposer,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        keyword: Arc<dyn KeywordSearch>,
        vector: Arc<dyn VectorSearch>,
        classifier: Classifier,
        composer: AnswerComposer,
    ) -> Self {
        Self {
            keyword,
            vector,
            fuser: Fuser::default(),
            classifier,
            router: ToolRouter::default(),
            tool_client: None,
            composer,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fuser(mut self, fuser: Fuser) -> Self {
        self.fuser = fuser;
        self
    }

    pub fn with_router(mut self, router: ToolRouter) -> Self {
        self.router = router;
        self
    }

    /// Enable live data. Without a tool client routed requests are dropped.
    pub fn with_tool_client(mut self, client: Arc<dyn ToolClient>) -> Self {
        self.tool_client = Some(client);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer a query.
    pub async fn run(&self, query: &Query) -> Result<AssistantResponse, PipelineError> {
        self.run_with_cancel(query, CancellationToken::new()).await
    }

    /// Answer a query, abandoning it when `cancel` fires.
    ///
    /// Cancellation drops every in-flight sub-call; partial results are
    /// discarded.
    pub async fn run_with_cancel(
        &self,
        query: &Query,
        cancel: CancellationToken,
    ) -> Result<AssistantResponse, PipelineError> {
        if query.is_blank() {
            return Err(PipelineError::InvalidQuery(
                "query text is empty".to_string(),
            ));
        }

        let span = info_span!("query", id = %query.id());
        async {
            info!(session_id = ?query.session_id(), "Query received");
            let pipeline = async {
                match self.config.deadline {
                    Some(deadline) => tokio::time::timeout(deadline, self.execute(query))
                        .await
                        .unwrap_or_else(|_| {
                            warn!(deadline_ms = deadline.as_millis() as u64, "Query deadline exceeded");
                            Err(PipelineError::DeadlineExceeded(deadline.as_millis() as u64))
                        }),
                    None => self.execute(query).await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Query cancelled; discarding partial results");
                    Err(PipelineError::Cancelled)
                }
                result = pipeline => result,
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, query: &Query) -> Result<AssistantResponse, PipelineError> {
        let query_id = query.id();
        stage(query_id, PipelineStage::Received);
        let mut degradations = Vec::new();

        stage(query_id, PipelineStage::Retrieving);
        let (keyword, vector) = tokio::join!(self.search_keyword(query), self.search_vector(query));
        let retrieval_failed = keyword.is_err() && vector.is_err();
        let keyword_results = keyword.unwrap_or_else(|d| {
            degradations.push(d);
            Vec::new()
        });
        let vector_results = vector.unwrap_or_else(|d| {
            degradations.push(d);
            Vec::new()
        });

        stage(query_id, PipelineStage::Fusing);
        let fused = self.fuser.fuse(keyword_results, vector_results);
        debug!(query_id, fused = fused.len(), "Fused retrieval results");

        stage(query_id, PipelineStage::ClassifyingAndRouting);
        let early = self.router.route_query(query);
        let early_call = async {
            match &early {
                Some(request) => self.invoke_tool(query, request).await,
                None => None,
            }
        };
        let (run, early_response) =
            tokio::join!(self.classifier.classify_all(query_id, &fused), early_call);
        if run.is_degraded() {
            degradations.push(Degradation::ClassificationUnavailable);
        }

        let tool_response = match early {
            Some(_) => early_response,
            None => match self.router.route_labels(query, &run.classification) {
                Some(request) => self.invoke_tool(query, &request).await,
                None => None,
            },
        };

        stage(query_id, PipelineStage::Composing);
        let response = self
            .composer
            .compose(query, fused, run.classification, tool_response, degradations)
            .await;

        if retrieval_failed && response.has(Degradation::SynthesisUnavailable) {
            warn!(query_id, "Every retrieval path and synthesis failed");
            return Err(PipelineError::QueryFailed(
                "no retrieval backend or synthesis provider could be reached".to_string(),
            ));
        }

        stage(query_id, PipelineStage::Done);
        info!(
            query_id,
            snippets = response.snippets.len(),
            live_data = response.has_live_data(),
            degradations = response.degradations.len(),
            "Query answered"
        );
        Ok(response)
    }

    async fn search_keyword(&self, query: &Query) -> Result<Vec<CandidateSnippet>, Degradation> {
        let search = self
            .keyword
            .search(query.text().trim(), self.config.keyword_limit);
        match tokio::time::timeout(self.config.keyword_timeout, search).await {
            Ok(Ok(results)) => {
                debug!(query_id = query.id(), hits = results.len(), "Keyword search done");
                Ok(results)
            }
            Ok(Err(e)) => {
                warn!(
                    query_id = query.id(),
                    backend = self.keyword.id(),
                    error = %e,
                    "Keyword search failed; treating as empty"
                );
                Err(Degradation::KeywordSearchUnavailable)
            }
            Err(_) => {
                warn!(
                    query_id = query.id(),
                    backend = self.keyword.id(),
                    timeout_ms = self.config.keyword_timeout.as_millis() as u64,
                    "Keyword search timed out; treating as empty"
                );
                Err(Degradation::KeywordSearchTimedOut)
            }
        }
    }

    async fn search_vector(&self, query: &Query) -> Result<Vec<CandidateSnippet>, Degradation> {
        let search = self.vector.search(
            VectorQuery::Text(query.text().trim().to_string()),
            self.config.vector_limit,
        );
        match tokio::time::timeout(self.config.vector_timeout, search).await {
            Ok(Ok(results)) => {
                debug!(query_id = query.id(), hits = results.len(), "Vector search done");
                Ok(results)
            }
            Ok(Err(e)) => {
                warn!(
                    query_id = query.id(),
                    backend = self.vector.id(),
                    error = %e,
                    "Vector search failed; treating as empty"
                );
                Err(Degradation::VectorSearchUnavailable)
            }
            Err(_) => {
                warn!(
                    query_id = query.id(),
                    backend = self.vector.id(),
                    timeout_ms = self.config.vector_timeout.as_millis() as u64,
                    "Vector search timed out; treating as empty"
                );
                Err(Degradation::VectorSearchTimedOut)
            }
        }
    }

    /// Invoke the routed tool. `None` when no tool client is configured.
    async fn invoke_tool(&self, query: &Query, request: &ToolRequest) -> Option<ToolResponse> {
        let client = self.tool_client.as_ref()?;
        stage(query.id(), PipelineStage::ToolInvoking);

        let timeout_ms = self.config.tool_timeout.as_millis() as u64;
        let result = tokio::time::timeout(self.config.tool_timeout, client.invoke(request))
            .await
            .unwrap_or(Err(ToolError::Timeout(timeout_ms)));

        match &result {
            Ok(_) => info!(query_id = query.id(), tool = %request.tool, "Tool call succeeded"),
            Err(e) => warn!(
                query_id = query.id(),
                tool = %request.tool,
                client = client.id(),
                reason = e.reason_code(),
                error = %e,
                "Tool call failed; continuing without live data"
            ),
        }
        Some(ToolResponse::from_result(request.tool.clone(), result))
    }
}

fn stage(query_id: &str, stage: PipelineStage) {
    debug!(query_id, stage = %stage, "Pipeline stage");
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
