//! Immutable value objects shared across entities and ports.

mod artifact_id;
mod artifact_type;
mod ids;

pub use artifact_id::{ArtifactId, ORPHANED_ARTIFACTS_FOLDER};
pub use artifact_type::ArtifactType;
pub use ids::{FolderId, JobId};
