//! Training pool entities: examples and emitted batches.

use serde::{Deserialize, Serialize};

use crate::entities::FeedbackType;
use crate::value_objects::ArtifactType;

/// Provenance of a [`TrainingExample`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingExampleSource {
    /// Derived from a real feedback event.
    Feedback,
    /// Produced by the data augmenter from a real example.
    Synthetic,
}

/// A single candidate training example living in a type-scoped pool buffer
/// (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    /// The artifact type this example trains.
    pub artifact_type: ArtifactType,
    /// The instruction/prompt framing for this example.
    pub instruction: String,
    /// The input (meeting notes / context) for this example.
    pub input: String,
    /// The target output.
    pub output: String,
    /// Quality score in `[0, 100]`.
    pub quality_score: f64,
    /// Where this example came from.
    pub source: TrainingExampleSource,
    /// The feedback kind this example was admitted under, when it was
    /// admitted directly from a feedback or ladder-success event rather
    /// than synthesized (§4.7 admission gate needs this to enforce the
    /// `success`-specific `score < 80` discard rule).
    pub feedback_type: Option<FeedbackType>,
    /// Optional curriculum category tag.
    pub category: Option<String>,
    /// Optional curriculum difficulty bucket (`easy`/`medium`/`hard`).
    pub difficulty: Option<String>,
    /// `true` if generic/templated content was detected (excluded from pool
    /// admission regardless of score, §4.7).
    pub is_generic_content: bool,
}

/// A batch of selected, augmented, hyperparameter-tuned examples emitted
/// when a pool threshold is crossed (§3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingBatch {
    /// Opaque batch identifier.
    pub batch_id: String,
    /// The artifact type this batch trains.
    pub artifact_type: ArtifactType,
    /// The selected (and possibly augmented) examples.
    pub examples: Vec<TrainingExample>,
    /// Scheduling priority; `major` batches outrank `incremental` ones.
    pub priority: BatchPriority,
    /// Hyperparameters looked up for this type.
    pub hyperparameters: serde_json::Value,
    /// Free-form metadata (curriculum stage, augmentation strategy used, …).
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Whether a batch crossed the incremental or major pool threshold (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPriority {
    /// Crossed `incremental_threshold`.
    Incremental,
    /// Crossed `major_threshold`.
    Major,
}
