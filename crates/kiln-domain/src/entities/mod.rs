//! Core business entities with identity.

mod artifact;
mod failure_case;
mod feedback;
mod job;
mod performance;
mod training;
mod version;

pub use artifact::{Artifact, ArtifactValidation};
pub use failure_case::FailureCase;
pub use feedback::{FeedbackEvent, FeedbackType};
pub use job::{Attempt, Job, JobStatus};
pub use performance::PerformanceMetrics;
pub use training::{BatchPriority, TrainingBatch, TrainingExample, TrainingExampleSource};
pub use version::{Version, VersionDiffSummary, VersionMetadata};
