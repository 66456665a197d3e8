//! Feedback Store & Training Readiness (§4.6), composing Training Batch
//! Emission (§4.7) when a pool threshold is crossed.

use std::sync::Arc;

use chrono::Utc;
use kiln_domain::entities::{FeedbackEvent, FeedbackType, TrainingBatch, TrainingExample, TrainingExampleSource};
use kiln_domain::ports::{FeedbackStorePort, FinetuningPoolPort, HardNegativeStorePort, HyperparameterStorePort};
use kiln_domain::value_objects::{ArtifactId, ArtifactType};
use kiln_domain::Result;

use crate::config::KilnConfig;
use crate::training::{
    batch_sizer::BatchSizerBounds, emit_batch, EmissionRequest, EmissionTrigger,
    HyperparameterHistory, HyperparameterTrial, Hyperparameters, QualityTrend,
};

/// Input to [`FeedbackService::record_feedback`] (§4.6 `RecordFeedback`).
pub struct RecordFeedbackRequest {
    /// The artifact this feedback judges.
    pub artifact_id: ArtifactId,
    /// The artifact's type.
    pub artifact_type: ArtifactType,
    /// The AI-produced content being judged.
    pub ai_output: String,
    /// An explicit score, if the caller has one; otherwise normalized from
    /// `feedback_type` (§4.6).
    pub validation_score: Option<u8>,
    /// The kind of feedback.
    pub feedback_type: FeedbackType,
    /// The human-corrected content, for `Correction` feedback.
    pub corrected_output: Option<String>,
    /// Free-form provenance context.
    pub context: serde_json::Value,
    /// `true` if this content was flagged as generic boilerplate (never
    /// pool-admitted regardless of score).
    pub is_generic_content: bool,
}

/// Result of [`FeedbackService::record_feedback`].
pub struct RecordFeedbackResult {
    /// Always `true` on success — kept for parity with the spec's response
    /// shape.
    pub event_recorded: bool,
    /// `true` if this call crossed a pool threshold and emitted a batch.
    pub training_triggered: bool,
    /// Human-readable summary.
    pub message: String,
}

/// Result of [`FeedbackService::training_ready`] (§4.6 `TrainingReady`).
pub struct TrainingReadiness {
    /// `true` if `have >= needed`.
    pub ready: bool,
    /// Examples required for the next incremental batch.
    pub needed: usize,
    /// Examples currently pooled.
    pub have: usize,
}

/// Composition-root-wired use case for feedback recording and training-batch
/// emission.
pub struct FeedbackService {
    feedback_store: Arc<dyn FeedbackStorePort>,
    pool: Arc<dyn FinetuningPoolPort>,
    hard_negatives: Arc<dyn HardNegativeStorePort>,
    hyperparameters: Arc<dyn HyperparameterStorePort>,
    config: Arc<KilnConfig>,
}

impl FeedbackService {
    /// Wire a feedback service from its collaborators.
    #[must_use]
    pub fn new(
        feedback_store: Arc<dyn FeedbackStorePort>,
        pool: Arc<dyn FinetuningPoolPort>,
        hard_negatives: Arc<dyn HardNegativeStorePort>,
        hyperparameters: Arc<dyn HyperparameterStorePort>,
        config: Arc<KilnConfig>,
    ) -> Self {
        Self {
            feedback_store,
            pool,
            hard_negatives,
            hyperparameters,
            config,
        }
    }

    /// Record one feedback event, admit it to the pool if it clears the
    /// quality bar, and emit a training batch if a threshold was just
    /// crossed (§4.6).
    pub async fn record_feedback(&self, request: RecordFeedbackRequest) -> Result<RecordFeedbackResult> {
        let score = request
            .validation_score
            .unwrap_or_else(|| request.feedback_type.normalized_default_score());

        let event = FeedbackEvent {
            artifact_id: request.artifact_id,
            artifact_type: request.artifact_type.clone(),
            feedback_type: request.feedback_type,
            score,
            ai_output: request.ai_output.clone(),
            corrected_content: request.corrected_output.clone(),
            timestamp: Utc::now().timestamp(),
            context: request.context,
        };
        self.feedback_store.append(event).await?;

        let prev_size = self.pool.size(&request.artifact_type).await?;

        if score >= 85 && !request.is_generic_content {
            let output = request.corrected_output.unwrap_or_else(|| request.ai_output.clone());
            let example = TrainingExample {
                artifact_type: request.artifact_type.clone(),
                instruction: format!("Generate a {} artifact from the given notes.", request.artifact_type.as_str()),
                input: request.ai_output,
                output,
                quality_score: f64::from(score),
                source: TrainingExampleSource::Feedback,
                feedback_type: Some(request.feedback_type),
                category: None,
                difficulty: None,
                is_generic_content: request.is_generic_content,
            };
            self.pool.add(example).await?;
        }

        let new_size = self.pool.size(&request.artifact_type).await?;
        let crossed_major = prev_size < self.config.pool.major_threshold && new_size >= self.config.pool.major_threshold;
        let crossed_incremental =
            !crossed_major && prev_size < self.config.pool.incremental_threshold && new_size >= self.config.pool.incremental_threshold;

        let training_triggered = if crossed_major {
            self.emit_for_trigger(&request.artifact_type, EmissionTrigger::Major).await?.is_some()
        } else if crossed_incremental {
            self.emit_for_trigger(&request.artifact_type, EmissionTrigger::Incremental).await?.is_some()
        } else {
            false
        };

        Ok(RecordFeedbackResult {
            event_recorded: true,
            training_triggered,
            message: format!("feedback recorded (score {score}); pool at {new_size}"),
        })
    }

    /// Whether `artifact_type`'s pool has enough examples for the next
    /// incremental batch (§4.6 `TrainingReady`). `None` reports against the
    /// incremental threshold with `have = 0` (no single type to check).
    pub async fn training_ready(&self, artifact_type: Option<&ArtifactType>) -> Result<TrainingReadiness> {
        let needed = self.config.pool.incremental_threshold;
        let have = match artifact_type {
            Some(ty) => self.pool.size(ty).await?,
            None => 0,
        };
        Ok(TrainingReadiness {
            ready: have >= needed,
            needed,
            have,
        })
    }

    async fn emit_for_trigger(
        &self,
        artifact_type: &ArtifactType,
        trigger: EmissionTrigger,
    ) -> Result<Option<TrainingBatch>> {
        let pool_examples = self.pool.examples(artifact_type).await?;
        let failures = self.hard_negatives.all(Some(artifact_type)).await?;

        let mut history = HyperparameterHistory::default();
        if let Some(config_json) = self.hyperparameters.load_best(artifact_type).await? {
            if let Ok(config) = serde_json::from_value::<Hyperparameters>(config_json) {
                history.record(HyperparameterTrial { config, objective: 1.0 });
            }
        }

        let request = EmissionRequest {
            artifact_type: artifact_type.clone(),
            cumulative_seen: pool_examples.len(),
            pool: pool_examples.clone(),
            failures: &failures,
            trend: QualityTrend::Flat,
            trigger,
            augmentation_factor: self.config.pool.augmentation_factor,
            bounds: BatchSizerBounds {
                min_batch: self.config.pool.min_batch,
                max_batch: self.config.pool.max_batch,
            },
            quality_target: self.config.pool.quality_target,
            hyperparameters: &history,
        };

        let batch = emit_batch(request);
        Ok(batch)
    }
}
