//! Version Store port (§4.4, §6).

use async_trait::async_trait;

use crate::entities::{Version, VersionDiffSummary, VersionMetadata};
use crate::error::Result;
use crate::value_objects::{ArtifactId, ArtifactType};

/// Contract for the authoritative, append-only history of every artifact
/// (§4.4). Implementations must serialize concurrent `create`/`restore`
/// calls on the same `artifact_id` such that version numbers stay dense,
/// unique, and strictly increasing in commit order (§5).
#[async_trait]
pub trait VersionStorePort: Send + Sync {
    /// Append a new current version, demoting any prior current version.
    async fn create(
        &self,
        artifact_id: &ArtifactId,
        artifact_type: &ArtifactType,
        content: &str,
        metadata: VersionMetadata,
        folder_id: Option<&str>,
    ) -> Result<Version>;

    /// All versions for an id, ascending by version number.
    async fn get_versions(&self, artifact_id: &ArtifactId) -> Result<Vec<Version>>;

    /// The current version for an id, if any exist.
    async fn get_current(&self, artifact_id: &ArtifactId) -> Result<Option<Version>>;

    /// A specific version by number.
    async fn get_by_version(
        &self,
        artifact_id: &ArtifactId,
        version_number: u32,
    ) -> Result<Option<Version>>;

    /// Compare two versions of the same id.
    async fn compare(
        &self,
        artifact_id: &ArtifactId,
        n1: u32,
        n2: u32,
    ) -> Result<VersionDiffSummary>;

    /// Create a new version whose content equals version `n`'s content,
    /// recording `restored_from` in metadata.
    async fn restore(&self, artifact_id: &ArtifactId, version_number: u32) -> Result<Version>;

    /// Delete all versions for an id; returns whether anything existed and
    /// how many versions were removed.
    async fn delete_all(&self, artifact_id: &ArtifactId) -> Result<(bool, usize)>;

    /// All versions across ids whose artifact type (by exact field match or
    /// id-prefix match, case/separator-insensitive) matches, newest first.
    async fn list_by_type(&self, artifact_type: &str) -> Result<Vec<Version>>;

    /// Every current version across every id, for `ListArtifacts` grouping
    /// (§6) — unlike `list_by_type`, not filtered to one artifact type.
    async fn list_all_current(&self) -> Result<Vec<Version>>;
}
