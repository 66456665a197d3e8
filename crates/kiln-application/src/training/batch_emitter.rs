//! Training batch emission (§4.7 steps 1-5): composes batch sizing,
//! curriculum/active-learning selection, hard-negative injection, data
//! augmentation, and hyperparameter lookup into one [`kiln_domain::entities::TrainingBatch`].

use kiln_domain::entities::{
    BatchPriority, FailureCase, TrainingBatch, TrainingExample, TrainingExampleSource,
};
use kiln_domain::value_objects::ArtifactType;

use super::active_learner::{select_top_k, Candidate};
use super::augmenter::augment;
use super::batch_sizer::{dynamic_batch_size, BatchSizerBounds, QualityTrend};
use super::hard_negatives::{hardest, max_hard_negatives_for_batch};
use super::hyperparameters::HyperparameterHistory;

/// Which threshold triggered emission (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionTrigger {
    /// Pool size crossed `incremental_threshold`.
    Incremental,
    /// Pool size crossed `major_threshold`.
    Major,
}

impl From<EmissionTrigger> for BatchPriority {
    fn from(trigger: EmissionTrigger) -> Self {
        match trigger {
            EmissionTrigger::Incremental => Self::Incremental,
            EmissionTrigger::Major => Self::Major,
        }
    }
}

/// Inputs needed to emit one training batch for a pool-threshold crossing.
pub struct EmissionRequest<'a> {
    /// The artifact type whose pool crossed a threshold.
    pub artifact_type: ArtifactType,
    /// All currently pooled examples for this type.
    pub pool: Vec<TrainingExample>,
    /// Stored failure cases, for hard-negative mining.
    pub failures: &'a [FailureCase],
    /// Rolling quality trend for this type.
    pub trend: QualityTrend,
    /// Cumulative examples seen historically for this type (rarity input).
    pub cumulative_seen: usize,
    /// Which threshold fired.
    pub trigger: EmissionTrigger,
    /// Augmentation expansion factor (§4.7.5).
    pub augmentation_factor: usize,
    /// Batch-size bounds and quality target (§4.7.1).
    pub bounds: BatchSizerBounds,
    /// Quality target used by the batch sizer's quality multiplier.
    pub quality_target: f64,
    /// Best-known hyperparameters for this type.
    pub hyperparameters: &'a HyperparameterHistory,
}

/// Average quality in `[0, 1]`, normalized from `TrainingExample`'s 0-100
/// `quality_score` scale (§4.7.1 takes `q ∈ [0,1]`).
fn average_quality(examples: &[TrainingExample]) -> f64 {
    if examples.is_empty() {
        return 0.0;
    }
    (examples.iter().map(|e| e.quality_score).sum::<f64>() / examples.len() as f64 / 100.0).clamp(0.0, 1.0)
}

fn to_candidate(example: &TrainingExample, idx: usize) -> Candidate {
    Candidate {
        id: idx.to_string(),
        artifact_type: example.artifact_type.clone(),
        content: format!("{}\n{}", example.input, example.output),
        context_size: example.input.len(),
        validation_score: example.quality_score.clamp(0.0, 100.0) as u8,
        is_correction_or_failure: example.source == TrainingExampleSource::Feedback,
        reward: (example.quality_score / 100.0) * 2.0 - 1.0,
    }
}

/// Compose a single [`TrainingBatch`] for one pool-threshold crossing,
/// following §4.7's five-step emission recipe. Returns `None` if the pool
/// doesn't contain enough examples for even the minimum batch size.
#[must_use]
pub fn emit_batch(request: EmissionRequest<'_>) -> Option<TrainingBatch> {
    let avg_quality = average_quality(&request.pool);
    let size = dynamic_batch_size(
        request.pool.len(),
        avg_quality,
        request.quality_target,
        request.trend,
        request.cumulative_seen,
        &request.bounds,
    );
    if size == 0 {
        return None;
    }

    let candidates: Vec<Candidate> = request
        .pool
        .iter()
        .enumerate()
        .map(|(i, e)| to_candidate(e, i))
        .collect();
    let selected_ids: Vec<String> = select_top_k(candidates, size).into_iter().map(|c| c.id).collect();

    let mut selected: Vec<TrainingExample> = selected_ids
        .iter()
        .filter_map(|id| id.parse::<usize>().ok())
        .filter_map(|idx| request.pool.get(idx).cloned())
        .collect();

    let hard_negative_cap = max_hard_negatives_for_batch(size);
    let hard_negatives = hardest(request.failures, Some(&request.artifact_type), 0.5, hard_negative_cap);
    for failure in hard_negatives {
        selected.push(TrainingExample {
            artifact_type: failure.artifact_type.clone(),
            instruction: "Generate a correct artifact, avoiding this known failure mode.".to_owned(),
            input: failure.input.clone(),
            output: failure.output.clone(),
            quality_score: f64::from(failure.validation_score),
            source: TrainingExampleSource::Synthetic,
            feedback_type: None,
            category: Some("hard_negative".to_owned()),
            difficulty: Some("hard".to_owned()),
            is_generic_content: false,
        });
    }

    let family = request.artifact_type.validator_family();
    let augmented: Vec<TrainingExample> = selected
        .iter()
        .flat_map(|example| augment(example, request.augmentation_factor, family))
        .collect();

    let hyperparameters = request.hyperparameters.best();
    let hyperparameters_json = serde_json::to_value(hyperparameters).unwrap_or(serde_json::Value::Null);

    let mut metadata = serde_json::Map::new();
    metadata.insert("selected_count".to_owned(), selected.len().into());
    metadata.insert("augmented_count".to_owned(), augmented.len().into());
    metadata.insert("avg_quality".to_owned(), avg_quality.into());

    Some(TrainingBatch {
        batch_id: format!("{}-{:?}-{}", request.artifact_type.as_str(), request.trigger, augmented.len()),
        artifact_type: request.artifact_type,
        examples: augmented,
        priority: request.trigger.into(),
        hyperparameters: hyperparameters_json,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_example(ty: &str, score: f64) -> TrainingExample {
        TrainingExample {
            artifact_type: ArtifactType::new(ty),
            instruction: "create an erd for orders".to_owned(),
            input: "user places orders".to_owned(),
            output: "erDiagram\nUser ||--o{ Order : places".to_owned(),
            quality_score: score,
            source: TrainingExampleSource::Feedback,
            feedback_type: None,
            category: Some("commerce".to_owned()),
            difficulty: None,
            is_generic_content: false,
        }
    }

    #[test]
    fn too_small_a_pool_emits_nothing() {
        let request = EmissionRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            pool: vec![pool_example("mermaid_erd", 90.0)],
            failures: &[],
            trend: QualityTrend::Flat,
            cumulative_seen: 10,
            trigger: EmissionTrigger::Incremental,
            augmentation_factor: 2,
            bounds: BatchSizerBounds::default(),
            quality_target: 0.9,
            hyperparameters: &HyperparameterHistory::default(),
        };
        assert!(emit_batch(request).is_none());
    }

    #[test]
    fn sufficient_pool_emits_a_batch_with_expected_priority() {
        let pool: Vec<_> = (0..60).map(|_| pool_example("mermaid_erd", 85.0)).collect();
        let request = EmissionRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            pool,
            failures: &[],
            trend: QualityTrend::Flat,
            cumulative_seen: 200,
            trigger: EmissionTrigger::Major,
            augmentation_factor: 2,
            bounds: BatchSizerBounds::default(),
            quality_target: 0.9,
            hyperparameters: &HyperparameterHistory::default(),
        };
        let batch = emit_batch(request).expect("batch should be emitted");
        assert_eq!(batch.priority, BatchPriority::Major);
        assert!(!batch.examples.is_empty());
    }
}
