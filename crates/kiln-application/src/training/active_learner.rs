//! Active Learner (§4.7.3).
//!
//! Greedy top-`k` selection by informativeness, combining uncertainty,
//! diversity against the growing selection, and reward-derived quality.

use kiln_domain::value_objects::ArtifactType;

use super::similarity::token_overlap_similarity;

/// One candidate considered for selection.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Opaque identifier carried through to the selected output.
    pub id: String,
    /// Artifact type, for the diversity metric's type-equality term.
    pub artifact_type: ArtifactType,
    /// Text content, for the diversity metric's token-overlap term.
    pub content: String,
    /// Size of the retrieved context used to produce this candidate.
    pub context_size: usize,
    /// Validator score in `[0, 100]`.
    pub validation_score: u8,
    /// `true` if this candidate is a user correction or explicit failure —
    /// bumps uncertainty.
    pub is_correction_or_failure: bool,
    /// Precomputed reward in `[-1, 1]` (§4.7.7).
    pub reward: f64,
}

fn uncertainty(candidate: &Candidate) -> f64 {
    let base = 1.0 - f64::from(candidate.validation_score) / 100.0;
    if candidate.is_correction_or_failure {
        (base + 0.2).min(1.0)
    } else {
        base
    }
}

fn quality(candidate: &Candidate) -> f64 {
    (candidate.reward + 1.0) / 2.0
}

/// Similarity used for diversity scoring: type equality, token overlap, and
/// context-size ratio (length ratio folded in via content length).
fn candidate_similarity(a: &Candidate, b: &Candidate) -> f64 {
    let type_sim = f64::from(a.artifact_type == b.artifact_type);
    let token_sim = token_overlap_similarity(&a.content, &b.content);
    let len_a = a.content.chars().count().max(1);
    let len_b = b.content.chars().count().max(1);
    let length_ratio = len_a.min(len_b) as f64 / len_a.max(len_b) as f64;
    let ctx_a = a.context_size.max(1);
    let ctx_b = b.context_size.max(1);
    let context_ratio = ctx_a.min(ctx_b) as f64 / ctx_a.max(ctx_b) as f64;

    (type_sim * 0.3 + token_sim * 0.4 + length_ratio * 0.15 + context_ratio * 0.15).clamp(0.0, 1.0)
}

fn diversity(candidate: &Candidate, selected: &[Candidate]) -> f64 {
    if selected.is_empty() {
        return 1.0;
    }
    let max_sim = selected
        .iter()
        .map(|s| candidate_similarity(candidate, s))
        .fold(0.0_f64, f64::max);
    1.0 - max_sim
}

fn informativeness(candidate: &Candidate, selected: &[Candidate]) -> f64 {
    0.4 * uncertainty(candidate) + 0.3 * diversity(candidate, selected) + 0.3 * quality(candidate)
}

/// Greedily select up to `k` candidates by informativeness, recomputing
/// diversity against the growing selection after each pick (§4.7.3).
#[must_use]
pub fn select_top_k(mut pool: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    let mut selected = Vec::with_capacity(k.min(pool.len()));
    while selected.len() < k && !pool.is_empty() {
        let (best_idx, _) = pool
            .iter()
            .enumerate()
            .map(|(i, c)| (i, informativeness(c, &selected)))
            .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
        selected.push(pool.remove(best_idx));
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, ty: &str, content: &str, score: u8, reward: f64) -> Candidate {
        Candidate {
            id: id.to_owned(),
            artifact_type: ArtifactType::new(ty),
            content: content.to_owned(),
            context_size: 100,
            validation_score: score,
            is_correction_or_failure: false,
            reward,
        }
    }

    #[test]
    fn selects_requested_count() {
        let pool = vec![
            candidate("a", "mermaid_erd", "alpha beta", 80, 0.5),
            candidate("b", "mermaid_erd", "gamma delta", 60, 0.1),
            candidate("c", "code_prototype", "fn main() {}", 40, -0.2),
        ];
        let selected = select_top_k(pool, 2);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn prefers_diverse_candidates_over_near_duplicates() {
        let pool = vec![
            candidate("a", "mermaid_erd", "alpha beta gamma delta epsilon", 70, 0.0),
            candidate("b", "mermaid_erd", "alpha beta gamma delta epsilon", 70, 0.0),
            candidate("c", "code_prototype", "totally unrelated content here", 70, 0.0),
        ];
        let selected = select_top_k(pool, 2);
        let ids: Vec<_> = selected.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"c"));
    }

    #[test]
    fn empty_pool_yields_empty_selection() {
        assert!(select_top_k(Vec::new(), 5).is_empty());
    }

    #[test]
    fn k_larger_than_pool_returns_whole_pool() {
        let pool = vec![candidate("a", "mermaid_erd", "x", 70, 0.0)];
        assert_eq!(select_top_k(pool, 10).len(), 1);
    }
}
