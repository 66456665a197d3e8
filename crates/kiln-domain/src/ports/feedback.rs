//! Feedback Store port (§4.6, §6).

use async_trait::async_trait;

use crate::entities::FeedbackEvent;
use crate::error::Result;
use crate::value_objects::ArtifactType;

/// Contract for the append-only feedback log (§4.6).
#[async_trait]
pub trait FeedbackStorePort: Send + Sync {
    /// Append a feedback record.
    async fn append(&self, event: FeedbackEvent) -> Result<()>;

    /// All feedback recorded for an artifact type, oldest first.
    async fn history(&self, artifact_type: &ArtifactType) -> Result<Vec<FeedbackEvent>>;

    /// All feedback recorded, oldest first.
    async fn all(&self) -> Result<Vec<FeedbackEvent>>;
}
