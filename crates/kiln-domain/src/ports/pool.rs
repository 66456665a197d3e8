//! Finetuning Pool port (§4.7, §6).

use async_trait::async_trait;

use crate::entities::TrainingExample;
use crate::error::Result;
use crate::value_objects::ArtifactType;

/// Contract for the per-type bounded buffer of training examples (§4.7).
#[async_trait]
pub trait FinetuningPoolPort: Send + Sync {
    /// Attempt to admit an example; returns `true` if it passed the quality
    /// gate and was added.
    async fn add(&self, example: TrainingExample) -> Result<bool>;

    /// All examples currently buffered for a type.
    async fn examples(&self, artifact_type: &ArtifactType) -> Result<Vec<TrainingExample>>;

    /// Current buffer size for a type.
    async fn size(&self, artifact_type: &ArtifactType) -> Result<usize>;

    /// Remove `examples` (by reference equality on content) from the pool.
    /// Batch emission never calls this itself — a batch's examples remain
    /// pooled until an explicit clear (§3) — so callers reach for this only
    /// to correct or prune specific entries out of band.
    async fn remove(&self, artifact_type: &ArtifactType, examples: &[TrainingExample]) -> Result<()>;

    /// Remove all `synthetic`-sourced examples for a type without touching
    /// real feedback-sourced entries (§3 invariant).
    async fn clear_synthetic(&self, artifact_type: &ArtifactType) -> Result<usize>;

    /// Remove everything buffered for a type.
    async fn clear_all(&self, artifact_type: &ArtifactType) -> Result<usize>;
}
