use super::*;
use contexta_protocols::Origin;

fn hit(id: &str, origin: Origin, score: f32) -> CandidateSnippet {
    CandidateSnippet::new(id, "test", format!("text of {}", id), origin, score)
}

fn keyword(items: &[(&str, f32)]) -> Vec<CandidateSnippet> {
    items.iter().map(|(id, s)| hit(id, Origin::Keyword, *s)).collect()
}

fn vector(items: &[(&str, f32)]) -> Vec<CandidateSnippet> {
    items.iter().map(|(id, s)| hit(id, Origin::Vector, *s)).collect()
}

#[test]
fn test_normalize_basic() {
    let normalized = min_max_normalize(&[10.0, 5.0, 0.0]);
    assert_eq!(normalized, vec![1.0, 0.5, 0.0]);
}

#[test]
fn test_normalize_single_and_flat() {
    assert_eq!(min_max_normalize(&[0.2]), vec![1.0]);
    assert_eq!(min_max_normalize(&[3.0, 3.0, 3.0]), vec![1.0, 1.0, 1.0]);
    assert!(min_max_normalize(&[]).is_empty());
}

#[test]
fn test_normalize_negative_scores() {
    let normalized = min_max_normalize(&[-1.0, -3.0]);
    assert_eq!(normalized, vec![1.0, 0.0]);
}

#[test]
fn test_normalize_non_finite() {
    let normalized = min_max_normalize(&[f32::NAN, 2.0, 4.0]);
    assert_eq!(normalized, vec![0.0, 0.0, 1.0]);
}

#[test]
fn test_fuse_disjoint_sizes_add_up() {
    let fuser = Fuser::default();
    let fused = fuser.fuse(
        keyword(&[("k1", 3.0), ("k2", 2.0), ("k3", 1.0)]),
        vector(&[("v1", 0.9), ("v2", 0.5)]),
    );

    assert_eq!(fused.len(), 5);
    let mut ids = fused.ids();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_fuse_overlap_sums_contributions() {
    let fuser = Fuser::new(FusionConfig {
        vector_weight: 0.6,
        keyword_weight: 0.4,
        max_results: None,
    });
    let fused = fuser.fuse(
        keyword(&[("a", 8.0), ("b", 4.0), ("c", 0.0)]),
        vector(&[("b", 0.9), ("d", 0.1)]),
    );

    let b = fused.get("b").unwrap();
    // keyword: (4 - 0) / 8 = 0.5, vector: (0.9 - 0.1) / 0.8 = 1.0
    assert!((b.keyword_score.unwrap() - 0.5).abs() < 1e-6);
    assert!((b.vector_score.unwrap() - 1.0).abs() < 1e-6);
    assert!((b.combined_score - (0.6 * 1.0 + 0.4 * 0.5)).abs() < 1e-6);
    assert_eq!(b.origins(), vec![Origin::Vector, Origin::Keyword]);
    assert_eq!(fused.len(), 4);
}

#[test]
fn test_fuse_overlap_keeps_vector_snippet_body() {
    let fuser = Fuser::default();
    let mut kw = keyword(&[("a", 1.0)]);
    kw[0].text = "keyword body".to_string();
    let mut vec_hits = vector(&[("a", 1.0)]);
    vec_hits[0].text = "vector body".to_string();

    let fused = fuser.fuse(kw, vec_hits);
    assert_eq!(fused.len(), 1);
    assert_eq!(fused.entries()[0].snippet.text, "vector body");
    assert!((fused.entries()[0].combined_score - 1.0).abs() < 1e-6);
}

#[test]
fn test_fuse_empty_inputs() {
    let fuser = Fuser::default();
    assert!(fuser.fuse(vec![], vec![]).is_empty());

    let only_keyword = fuser.fuse(keyword(&[("a", 1.0), ("b", 0.5)]), vec![]);
    assert_eq!(only_keyword.ids(), vec!["a", "b"]);

    let only_vector = fuser.fuse(vec![], vector(&[("x", 0.3)]));
    assert_eq!(only_vector.ids(), vec!["x"]);
    assert!((only_vector.entries()[0].combined_score - 0.5).abs() < 1e-6);
}

#[test]
fn test_fuse_ties_prefer_vector_then_rank() {
    let fuser = Fuser::default();
    // Single-result batches normalize to 1.0, so both score 0.5.
    let fused = fuser.fuse(keyword(&[("kw", 7.0)]), vector(&[("vec", 0.2)]));
    assert_eq!(fused.ids(), vec!["vec", "kw"]);

    // Flat keyword batch: all 0.5, keep original rank order.
    let fused = fuser.fuse(keyword(&[("z", 1.0), ("y", 1.0), ("x", 1.0)]), vec![]);
    assert_eq!(fused.ids(), vec!["z", "y", "x"]);
}

#[test]
fn test_fuse_is_deterministic() {
    let fuser = Fuser::default();
    let kw = keyword(&[("a", 1.0), ("b", 1.0), ("c", 0.5), ("d", 0.2)]);
    let vc = vector(&[("e", 0.9), ("c", 0.8), ("f", 0.8), ("g", 0.1)]);

    let first = fuser.fuse(kw.clone(), vc.clone());
    for _ in 0..20 {
        assert_eq!(fuser.fuse(kw.clone(), vc.clone()), first);
    }
}

#[test]
fn test_fuse_respects_cap() {
    let fuser = Fuser::new(FusionConfig::default().with_max_results(2));
    let fused = fuser.fuse(
        keyword(&[("a", 3.0), ("b", 2.0), ("c", 1.0)]),
        vector(&[("d", 0.9)]),
    );
    assert_eq!(fused.len(), 2);
}

#[test]
fn test_fuse_dedups_within_batch() {
    let fuser = Fuser::default();
    let fused = fuser.fuse(keyword(&[("a", 5.0), ("a", 1.0), ("b", 1.0)]), vec![]);
    assert_eq!(fused.ids(), vec!["a", "b"]);
    assert_eq!(fused.get("a").unwrap().keyword_rank, Some(0));
}

#[test]
fn test_fuse_sorted_descending() {
    let fuser = Fuser::new(FusionConfig {
        vector_weight: 0.7,
        keyword_weight: 0.3,
        max_results: None,
    });
    let fused = fuser.fuse(
        keyword(&[("a", 9.0), ("b", 3.0), ("c", 1.0)]),
        vector(&[("c", 0.95), ("d", 0.4), ("e", 0.3)]),
    );
    let scores: Vec<f32> = fused.iter().map(|e| e.combined_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(fused.ids()[0], "c");
}
