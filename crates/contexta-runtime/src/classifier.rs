//! Zero-shot classification of fused snippets over a bounded worker pool.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use contexta_protocols::{
    CandidateSnippet, Classification, ClassificationBackend, ClassifierError, FusedResultSet,
    LabelScore, LabelSet,
};

/// Classifier settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Minimum confidence to retain a label (inclusive).
    pub threshold: f32,
    /// Maximum snippets scored concurrently across all queries.
    pub max_concurrency: usize,
    /// Per-snippet backend timeout.
    pub timeout: Duration,
    /// Input is truncated to this many characters before scoring.
    pub max_input_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            max_concurrency: 5,
            timeout: Duration::from_secs(5),
            max_input_chars: 1024,
        }
    }
}

/// Outcome of classifying a whole fused set.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRun {
    pub classification: Classification,
    /// Snippets whose classification failed and were left empty.
    pub failed: usize,
}

impl ClassificationRun {
    pub fn is_degraded(&self) -> bool {
        self.failed > 0
    }
}

/// Keep labels from `labels` at or above `threshold`, highest first.
///
/// Duplicate labels keep their best confidence; ties order by label name.
pub fn retain_labels(scores: Vec<LabelScore>, labels: &LabelSet, threshold: f32) -> Vec<LabelScore> {
    let mut kept: Vec<LabelScore> = Vec::with_capacity(scores.len());
    for score in scores {
        if !score.confidence.is_finite()
            || score.confidence < threshold
            || !labels.contains(&score.label)
        {
            continue;
        }
        match kept.iter_mut().find(|k| k.label == score.label) {
            Some(existing) if existing.confidence < score.confidence => {
                existing.confidence = score.confidence
            }
            Some(_) => {}
            None => kept.push(score),
        }
    }
    kept.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.label.cmp(&b.label))
    });
    kept
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Zero-shot classifier with an injected, immutable label set.
pub struct Classifier {
    backend: Arc<dyn ClassificationBackend>,
    labels: LabelSet,
    config: ClassifierConfig,
    permits: Arc<Semaphore>,
}

impl Classifier {
    pub fn new(backend: Arc<dyn ClassificationBackend>, labels: LabelSet) -> Self {
        Self::with_config(backend, labels, ClassifierConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn ClassificationBackend>,
        labels: LabelSet,
        config: ClassifierConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            backend,
            labels,
            config,
            permits,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one snippet against `labels`.
    ///
    /// Blank text or an empty label set yields an empty result without
    /// calling the backend.
    pub async fn classify(
        &self,
        snippet: &CandidateSnippet,
        labels: &LabelSet,
        threshold: f32,
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        let text = truncate_chars(snippet.text.trim(), self.config.max_input_chars);
        if text.is_empty() || labels.is_empty() {
            return Ok(Vec::new());
        }

        let scores = tokio::time::timeout(self.config.timeout, self.backend.score(text, labels))
            .await
            .map_err(|_| ClassifierError::Timeout(self.config.timeout.as_millis() as u64))??;

        Ok(retain_labels(scores, labels, threshold))
    }

    /// Classify every entry of `fused` with the configured labels and threshold.
    ///
    /// At most `max_concurrency` backend calls run at once; the rest wait
    /// for a permit. Failures leave that snippet's classification empty.
    pub async fn classify_all(&self, query_id: &str, fused: &FusedResultSet) -> ClassificationRun {
        let tasks = fused.iter().map(|entry| async move {
            let result = match self.permits.acquire().await {
                Ok(_permit) => {
                    self.classify(&entry.snippet, &self.labels, self.config.threshold)
                        .await
                }
                Err(_) => Err(ClassifierError::Unavailable(
                    "classifier pool closed".to_string(),
                )),
            };
            (entry.id(), result)
        });

        let mut run = ClassificationRun::default();
        for (snippet_id, result) in join_all(tasks).await {
            match result {
                Ok(labels) => {
                    debug!(query_id, snippet_id, labels = labels.len(), "Classified snippet");
                    run.classification.insert(snippet_id, labels);
                }
                Err(e) => {
                    warn!(
                        query_id,
                        snippet_id,
                        backend = self.backend.id(),
                        error = %e,
                        "Classification failed; leaving snippet unlabelled"
                    );
                    run.classification.insert(snippet_id, Vec::new());
                    run.failed += 1;
                }
            }
        }
        run
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
