//! Hard-Negative Miner (§4.7.4).

use kiln_domain::entities::FailureCase;
use kiln_domain::value_objects::ArtifactType;

/// Select the most difficult stored failures for `artifact_type` (or all
/// types, if `None`), honoring a minimum difficulty floor and a result cap
/// (§4.7.4).
#[must_use]
pub fn hardest(
    failures: &[FailureCase],
    artifact_type: Option<&ArtifactType>,
    min_difficulty: f64,
    limit: usize,
) -> Vec<FailureCase> {
    let mut matching: Vec<&FailureCase> = failures
        .iter()
        .filter(|f| artifact_type.is_none_or(|t| f.artifact_type == *t))
        .filter(|f| f.difficulty() >= min_difficulty)
        .collect();

    matching.sort_by(|a, b| {
        b.difficulty()
            .partial_cmp(&a.difficulty())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    matching.into_iter().take(limit).cloned().collect()
}

/// Cap on hard negatives added to a single training batch, relative to its
/// size (§4.7.4: "up to `batch_size/4`").
#[must_use]
pub fn max_hard_negatives_for_batch(batch_size: usize) -> usize {
    batch_size / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(ty: &str, score: u8, complexity: f64) -> FailureCase {
        FailureCase {
            artifact_type: ArtifactType::new(ty),
            input: "notes".to_owned(),
            output: "bad output".to_owned(),
            validation_score: score,
            failure_type: "validation".to_owned(),
            complexity_factors: vec![complexity],
            timestamp: 0,
        }
    }

    #[test]
    fn orders_by_descending_difficulty() {
        let failures = vec![failure("mermaid_erd", 80, 0.2), failure("mermaid_erd", 10, 0.9)];
        let hardest = hardest(&failures, None, 0.0, 10);
        assert_eq!(hardest[0].validation_score, 10);
    }

    #[test]
    fn filters_by_artifact_type() {
        let failures = vec![failure("mermaid_erd", 10, 0.9), failure("code_prototype", 10, 0.9)];
        let only_erd = hardest(&failures, Some(&ArtifactType::new("mermaid_erd")), 0.0, 10);
        assert_eq!(only_erd.len(), 1);
        assert_eq!(only_erd[0].artifact_type.as_str(), "mermaid_erd");
    }

    #[test]
    fn respects_minimum_difficulty_and_limit() {
        let failures = vec![
            failure("mermaid_erd", 95, 0.1),
            failure("mermaid_erd", 10, 0.9),
            failure("mermaid_erd", 20, 0.8),
        ];
        let picked = hardest(&failures, None, 0.5, 1);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].validation_score, 10);
    }

    #[test]
    fn batch_quarter_cap() {
        assert_eq!(max_hard_negatives_for_batch(100), 25);
        assert_eq!(max_hard_negatives_for_batch(21), 5);
    }
}
