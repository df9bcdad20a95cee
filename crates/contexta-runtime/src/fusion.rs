//! Result fusion: merge keyword and vector hits into one ranked set.

use std::cmp::Ordering;
use std::collections::HashMap;

use contexta_protocols::{CandidateSnippet, FusedResultSet, FusedSnippet};

/// Spread below which a batch is treated as having no spread.
const MIN_SPREAD: f32 = 1e-6;

/// Configuration for result fusion.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Weight applied to normalized vector scores.
    pub vector_weight: f32,
    /// Weight applied to normalized keyword scores.
    pub keyword_weight: f32,
    /// Optional cap on the fused set size.
    pub max_results: Option<usize>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            vector_weight: 0.5,
            keyword_weight: 0.5,
            max_results: None,
        }
    }
}

impl FusionConfig {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Min-max normalize a batch of scores into [0, 1].
///
/// A batch with one entry or no spread maps every score to 1.0.
/// Non-finite scores map to 0.0.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let finite = scores.iter().copied().filter(|s| s.is_finite());
    let (min, max) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s), hi.max(s))
    });

    let range = max - min;
    if scores.len() <= 1 || !range.is_finite() || range < MIN_SPREAD {
        return scores
            .iter()
            .map(|s| if s.is_finite() { 1.0 } else { 0.0 })
            .collect();
    }

    scores
        .iter()
        .map(|s| if s.is_finite() { (s - min) / range } else { 0.0 })
        .collect()
}

/// Drop repeated ids within one backend's list, keeping the best-ranked hit.
fn dedup_batch(results: Vec<CandidateSnippet>) -> Vec<CandidateSnippet> {
    let mut seen = std::collections::HashSet::new();
    results
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect()
}

/// Total ordering for fused entries: combined score descending, then
/// vector before keyword, then lower original rank, then id.
fn fused_order(a: &FusedSnippet, b: &FusedSnippet) -> Ordering {
    b.combined_score
        .total_cmp(&a.combined_score)
        .then_with(|| a.primary().cmp(&b.primary()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Weighted-sum fuser over min-max normalized scores.
#[derive(Debug, Clone, Default)]
pub struct Fuser {
    config: FusionConfig,
}

impl Fuser {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse both backends' results into one deduplicated, ordered set.
    ///
    /// Either input may be empty; two empty inputs give an empty set.
    pub fn fuse(
        &self,
        keyword_results: Vec<CandidateSnippet>,
        vector_results: Vec<CandidateSnippet>,
    ) -> FusedResultSet {
        let vector_results = dedup_batch(vector_results);
        let keyword_results = dedup_batch(keyword_results);

        let vector_norm =
            min_max_normalize(&vector_results.iter().map(|s| s.score).collect::<Vec<_>>());
        let keyword_norm =
            min_max_normalize(&keyword_results.iter().map(|s| s.score).collect::<Vec<_>>());

        let mut entries: Vec<FusedSnippet> =
            Vec::with_capacity(vector_results.len() + keyword_results.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (rank, (snippet, norm)) in vector_results.into_iter().zip(vector_norm).enumerate() {
            by_id.insert(snippet.id.clone(), entries.len());
            entries.push(FusedSnippet {
                snippet,
                combined_score: self.config.vector_weight * norm,
                vector_score: Some(norm),
                keyword_score: None,
                vector_rank: Some(rank),
                keyword_rank: None,
            });
        }

        for (rank, (snippet, norm)) in keyword_results.into_iter().zip(keyword_norm).enumerate() {
            let contribution = self.config.keyword_weight * norm;
            match by_id.get(&snippet.id) {
                Some(&idx) => {
                    // Already seen from the vector side; keep its snippet body.
                    let entry = &mut entries[idx];
                    entry.combined_score += contribution;
                    entry.keyword_score = Some(norm);
                    entry.keyword_rank = Some(rank);
                }
                None => {
                    by_id.insert(snippet.id.clone(), entries.len());
                    entries.push(FusedSnippet {
                        snippet,
                        combined_score: contribution,
                        vector_score: None,
                        keyword_score: Some(norm),
                        vector_rank: None,
                        keyword_rank: Some(rank),
                    });
                }
            }
        }

        entries.sort_by(fused_order);

        if let Some(cap) = self.config.max_results {
            entries.truncate(cap);
        }

        FusedResultSet::from_sorted(entries)
    }
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
