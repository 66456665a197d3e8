//! Text similarity metrics shared across the training pipeline.
//!
//! Grounded on `components/similarity_metrics.py`'s `SimilarityCalculator`,
//! minus the optional embedding backend (no embedding model ships with this
//! crate): combines normalized edit distance and token-overlap (Jaccard)
//! similarity.

/// Weighted combination of edit-distance and token-overlap similarity,
/// both in `[0, 1]`. Mirrors `calculate_all`'s `combined` score with the
/// embedding term folded into the edit-distance weight since no embedding
/// backend is available.
#[must_use]
pub fn combined_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let edit = edit_distance_similarity(a, b);
    let token = token_overlap_similarity(a, b);
    edit * 0.55 + token * 0.45
}

/// Normalized Levenshtein similarity: `1 - distance / max(len_a, len_b)`.
#[must_use]
pub fn edit_distance_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let distance = levenshtein(&a, &b);
    let max_len = a.len().max(b.len()) as f64;
    (1.0 - distance as f64 / max_len).max(0.0)
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Jaccard similarity over whitespace-tokenized, lowercased words. Serves as
/// the dependency-free stand-in for BLEU n-gram overlap.
#[must_use]
pub fn token_overlap_similarity(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;
    let ta: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let tb: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();
    if ta.is_empty() && tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Ratio of the shorter text's length to the longer's, in `[0, 1]`.
#[must_use]
pub fn length_ratio(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    let max = la.max(lb);
    if max == 0 {
        1.0
    } else {
        la.min(lb) as f64 / max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_are_fully_similar() {
        assert!((combined_similarity("hello world", "hello world") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(combined_similarity("", "anything"), 0.0);
    }

    #[test]
    fn near_identical_text_scores_high() {
        let sim = combined_similarity("Hello World", "Hello Wold");
        assert!(sim > 0.8, "expected high similarity, got {sim}");
    }

    #[test]
    fn unrelated_text_scores_low() {
        let sim = combined_similarity("Generate ERD diagram", "class UserModel: pass");
        assert!(sim < 0.5, "expected low similarity, got {sim}");
    }

    #[test]
    fn length_ratio_is_symmetric() {
        assert_eq!(length_ratio("abc", "abcdef"), length_ratio("abcdef", "abc"));
    }
}
