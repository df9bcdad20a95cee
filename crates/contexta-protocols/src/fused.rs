//! Fused result set produced by merging both retrieval backends.

use serde::{Deserialize, Serialize};

use crate::snippet::{CandidateSnippet, Origin};

/// One deduplicated entry of a fused result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedSnippet {
    pub snippet: CandidateSnippet,
    pub combined_score: f32,
    /// Normalized vector score, if the vector backend returned this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f32>,
    /// Normalized keyword score, if the keyword backend returned this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_score: Option<f32>,
    /// Zero-based rank in the vector backend's list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_rank: Option<usize>,
    /// Zero-based rank in the keyword backend's list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_rank: Option<usize>,
}

impl FusedSnippet {
    pub fn id(&self) -> &str {
        &self.snippet.id
    }

    /// Backends that returned this id, in priority order.
    pub fn origins(&self) -> Vec<Origin> {
        let mut origins = Vec::with_capacity(2);
        if self.vector_rank.is_some() {
            origins.push(Origin::Vector);
        }
        if self.keyword_rank.is_some() {
            origins.push(Origin::Keyword);
        }
        origins
    }

    /// Highest-priority origin and the rank it assigned.
    pub fn primary(&self) -> (Origin, usize) {
        match (self.vector_rank, self.keyword_rank) {
            (Some(rank), _) => (Origin::Vector, rank),
            (None, Some(rank)) => (Origin::Keyword, rank),
            (None, None) => (self.snippet.origin, usize::MAX),
        }
    }
}

/// Ordered, identifier-unique sequence of fused snippets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FusedResultSet {
    entries: Vec<FusedSnippet>,
}

impl FusedResultSet {
    /// Wrap entries that are already deduplicated and sorted.
    pub fn from_sorted(entries: Vec<FusedSnippet>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FusedSnippet> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[FusedSnippet] {
        &self.entries
    }

    /// The highest ranked `n` entries.
    pub fn top(&self, n: usize) -> &[FusedSnippet] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(FusedSnippet::id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&FusedSnippet> {
        self.entries.iter().find(|e| e.id() == id)
    }
}

impl<'a> IntoIterator for &'a FusedResultSet {
    type Item = &'a FusedSnippet;
    type IntoIter = std::slice::Iter<'a, FusedSnippet>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
