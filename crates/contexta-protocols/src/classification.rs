//! Topic classification types and the backend trait.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Labels used when no label set is configured.
pub const DEFAULT_LABELS: [&str; 6] = [
    "sports news",
    "broadcast information",
    "technical documentation",
    "production metadata",
    "industry news",
    "entertainment",
];

/// A topic label with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Immutable, process-wide set of candidate labels.
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Arc<[String]>,
}

impl LabelSet {
    /// Build a label set, dropping blanks and duplicates while keeping order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let labels: Vec<String> = labels
            .into_iter()
            .map(Into::into)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && seen.insert(l.clone()))
            .collect();
        Self {
            labels: labels.into(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

/// Labels retained per snippet id, each list ordered by descending confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification {
    by_snippet: BTreeMap<String, Vec<LabelScore>>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snippet_id: impl Into<String>, labels: Vec<LabelScore>) {
        self.by_snippet.insert(snippet_id.into(), labels);
    }

    /// Labels for a snippet; empty when unclassified or nothing passed the threshold.
    pub fn labels_for(&self, snippet_id: &str) -> &[LabelScore] {
        self.by_snippet
            .get(snippet_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_snippet(&self, snippet_id: &str) -> bool {
        self.by_snippet.contains_key(snippet_id)
    }

    /// Whether any snippet carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.by_snippet
            .values()
            .any(|labels| labels.iter().any(|l| l.label == label))
    }

    /// Distinct labels across all snippets, sorted.
    pub fn distinct_labels(&self) -> BTreeSet<&str> {
        self.by_snippet
            .values()
            .flatten()
            .map(|l| l.label.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LabelScore])> {
        self.by_snippet
            .iter()
            .map(|(id, labels)| (id.as_str(), labels.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_snippet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_snippet.is_empty()
    }
}

/// Zero-shot scoring backend.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Backend identifier used in logs.
    fn id(&self) -> &str;

    /// Score `text` against every label in `labels`. Thresholding is the
    /// caller's job; backends return raw confidences in [0, 1].
    async fn score(&self, text: &str, labels: &LabelSet)
        -> Result<Vec<LabelScore>, ClassifierError>;
}
