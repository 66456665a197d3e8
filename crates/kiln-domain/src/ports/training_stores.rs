//! Persistence ports for the training-pipeline components (§4.7.4, §4.7.6,
//! §4.8, §6).

use async_trait::async_trait;

use crate::entities::{FailureCase, PerformanceMetrics};
use crate::error::Result;
use crate::value_objects::ArtifactType;

/// Contract for persisted performance-tracking history (§4.8).
#[async_trait]
pub trait PerformanceStorePort: Send + Sync {
    /// Append an evaluation pass.
    async fn record(&self, metrics: PerformanceMetrics) -> Result<()>;

    /// History for a type, oldest first, optionally limited to the last `n`.
    async fn trend(&self, artifact_type: &ArtifactType, last_n: Option<usize>) -> Result<Vec<PerformanceMetrics>>;

    /// The best-recorded metrics for a type, per the dominance order.
    async fn best(&self, artifact_type: &ArtifactType) -> Result<Option<PerformanceMetrics>>;
}

/// Contract for the append-only failure-case log feeding the hard-negative
/// miner (§4.7.4).
#[async_trait]
pub trait HardNegativeStorePort: Send + Sync {
    /// Append a captured failure case.
    async fn append(&self, case: FailureCase) -> Result<()>;

    /// All failure cases for a type (or all types if `None`).
    async fn all(&self, artifact_type: Option<&ArtifactType>) -> Result<Vec<FailureCase>>;
}

/// Contract for persisted best-seen hyperparameter configurations (§4.7.6).
#[async_trait]
pub trait HyperparameterStorePort: Send + Sync {
    /// Store (or overwrite) the best-known config for a type.
    async fn save_best(&self, artifact_type: &ArtifactType, config: serde_json::Value) -> Result<()>;

    /// Load the best-known config for a type, if one has been recorded.
    async fn load_best(&self, artifact_type: &ArtifactType) -> Result<Option<serde_json::Value>>;
}
