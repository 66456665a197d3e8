//! Training pipeline (§4.7, §4.8): reward calculation, curriculum and
//! active learning, hard-negative mining, data augmentation, hyperparameter
//! tracking, and performance history — composed by [`batch_emitter`] into
//! emitted [`kiln_domain::entities::TrainingBatch`] records.

pub mod active_learner;
pub mod augmenter;
pub mod batch_emitter;
pub mod batch_sizer;
pub mod curriculum;
pub mod hard_negatives;
pub mod hyperparameters;
pub mod performance;
pub mod reward;
pub mod similarity;

pub use active_learner::{select_top_k, Candidate};
pub use augmenter::{augment, AugmentStrategy, AUGMENTED_QUALITY_DISCOUNT};
pub use batch_emitter::{emit_batch, EmissionRequest, EmissionTrigger};
pub use batch_sizer::{dynamic_batch_size, BatchSizerBounds, QualityTrend};
pub use curriculum::{classify, estimate_difficulty, CurriculumStage, CurriculumTracker, DifficultyBand, DifficultyInput};
pub use hard_negatives::{hardest, max_hard_negatives_for_batch};
pub use hyperparameters::{Hyperparameters, HyperparameterHistory, HyperparameterTrial};
pub use performance::{split_train_val, PerformanceTracker, MIN_VALIDATION_SAMPLES};
pub use reward::{calculate_reward, RewardInput, RewardTuning};
