//! Version Store use case (§4.4): a thin, typed wrapper over
//! [`VersionStorePort`] for the inbound `*Version*` operations (§6).

use std::sync::Arc;

use kiln_domain::entities::{Version, VersionDiffSummary};
use kiln_domain::ports::VersionStorePort;
use kiln_domain::value_objects::ArtifactId;
use kiln_domain::Result;

/// Composition-root-wired use case over the Version Store.
pub struct VersionService {
    versions: Arc<dyn VersionStorePort>,
}

impl VersionService {
    /// Wire a version service over its store.
    #[must_use]
    pub fn new(versions: Arc<dyn VersionStorePort>) -> Self {
        Self { versions }
    }

    /// `GetVersions` (§4.4).
    pub async fn get_versions(&self, artifact_id: &ArtifactId) -> Result<Vec<Version>> {
        self.versions.get_versions(artifact_id).await
    }

    /// `GetCurrent` (§4.4).
    pub async fn get_current(&self, artifact_id: &ArtifactId) -> Result<Option<Version>> {
        self.versions.get_current(artifact_id).await
    }

    /// `GetByVersion` (§4.4).
    pub async fn get_by_version(&self, artifact_id: &ArtifactId, version_number: u32) -> Result<Option<Version>> {
        self.versions.get_by_version(artifact_id, version_number).await
    }

    /// `CompareVersions` (§4.4).
    pub async fn compare(&self, artifact_id: &ArtifactId, n1: u32, n2: u32) -> Result<VersionDiffSummary> {
        self.versions.compare(artifact_id, n1, n2).await
    }

    /// `RestoreVersion` (§4.4).
    pub async fn restore(&self, artifact_id: &ArtifactId, version_number: u32) -> Result<Version> {
        self.versions.restore(artifact_id, version_number).await
    }

    /// `ListVersionsByType` (§4.4).
    pub async fn list_by_type(&self, artifact_type: &str) -> Result<Vec<Version>> {
        self.versions.list_by_type(artifact_type).await
    }
}
