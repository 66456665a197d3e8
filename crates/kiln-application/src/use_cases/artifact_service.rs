//! Artifact lifecycle use case (§6): `UpdateArtifact`/`ListArtifacts`/
//! `GetArtifact`/`DeleteArtifact`/`RegenerateArtifact`, layered over the
//! Version Store and the Generation Orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use kiln_domain::entities::{Artifact, ArtifactValidation};
use kiln_domain::ports::VersionStorePort;
use kiln_domain::value_objects::{ArtifactId, ArtifactType, FolderId, ORPHANED_ARTIFACTS_FOLDER};
use kiln_domain::{Error, Result};

use super::generation_orchestrator::{GenerationOrchestrator, GenerationRequest};

fn artifact_from_version(
    artifact_id: ArtifactId,
    artifact_type: ArtifactType,
    version: kiln_domain::entities::Version,
) -> Artifact {
    let model_used = version
        .metadata
        .get("model_used")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_owned();
    let score = version
        .metadata
        .get("validation_score")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u8;
    let is_valid = version
        .metadata
        .get("is_valid")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let html_content = version
        .metadata
        .get("html_content")
        .and_then(|v| v.as_str())
        .map(str::to_owned);

    Artifact {
        artifact_id,
        artifact_type,
        content: version.content,
        generated_at: version.created_at,
        model_used,
        validation: ArtifactValidation {
            score,
            is_valid,
            errors: Vec::new(),
            warnings: Vec::new(),
        },
        html_content,
        folder_id: version.folder_id,
    }
}

/// Composition-root-wired use case over artifact lifecycle operations.
pub struct ArtifactService {
    versions: Arc<dyn VersionStorePort>,
    orchestrator: Arc<GenerationOrchestrator>,
}

impl ArtifactService {
    /// Wire an artifact service over the Version Store and the orchestrator
    /// (needed for `RegenerateArtifact`).
    #[must_use]
    pub fn new(versions: Arc<dyn VersionStorePort>, orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { versions, orchestrator }
    }

    /// `GetArtifact` (§6): the current version, hydrated into an [`Artifact`].
    pub async fn get_artifact(&self, artifact_id: &ArtifactId) -> Result<Option<Artifact>> {
        let Some(version) = self.versions.get_current(artifact_id).await? else {
            return Ok(None);
        };
        let artifact_type = ArtifactType::new(artifact_id.artifact_type_str());
        Ok(Some(artifact_from_version(artifact_id.clone(), artifact_type, version)))
    }

    /// `UpdateArtifact` (§6): create a new version from manually-edited
    /// content, preserving the prior version's `folder_id`/`artifact_type`.
    pub async fn update_artifact(
        &self,
        artifact_id: &ArtifactId,
        content: &str,
        extra_metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Artifact> {
        let current = self
            .versions
            .get_current(artifact_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("artifact {}", artifact_id.as_str())))?;

        let artifact_type = ArtifactType::new(artifact_id.artifact_type_str());
        let mut metadata = extra_metadata.unwrap_or_default();
        metadata.insert("update_type".to_owned(), "manual_edit".into());
        metadata.insert("model_used".to_owned(), "manual_edit".into());

        let version = self
            .versions
            .create(
                artifact_id,
                &artifact_type,
                content,
                metadata,
                current.folder_id.as_deref(),
            )
            .await?;

        Ok(artifact_from_version(artifact_id.clone(), artifact_type, version))
    }

    /// `DeleteArtifact` (§6): remove every version for an id.
    pub async fn delete_artifact(&self, artifact_id: &ArtifactId) -> Result<(bool, usize)> {
        self.versions.delete_all(artifact_id).await
    }

    /// `RegenerateArtifact` (§6): resubmit a generation job using the
    /// current version's stored notes, or `notes_override` if supplied.
    pub async fn regenerate_artifact(
        &self,
        artifact_id: &ArtifactId,
        notes_override: Option<String>,
    ) -> Result<kiln_domain::value_objects::JobId> {
        let artifact_type = ArtifactType::new(artifact_id.artifact_type_str());
        let folder_id = artifact_id.folder_id().map(FolderId::new);

        let notes = match notes_override {
            Some(notes) => Some(notes),
            None => self
                .versions
                .get_current(artifact_id)
                .await?
                .and_then(|v| v.metadata.get("notes").and_then(|n| n.as_str()).map(str::to_owned)),
        };

        self.orchestrator
            .submit(GenerationRequest {
                artifact_type,
                notes,
                folder_id,
                context_id: None,
                use_validation: None,
                max_retries: None,
            })
            .await
    }

    /// `ListArtifacts` (§6): when `all_versions` is `false`, one entry per
    /// `(folder_id_or_default, artifact_type)` group (the current version of
    /// each); when `true`, every version across every id, grouped the same
    /// way but each expanded to its full history.
    pub async fn list_artifacts(&self, folder_id: Option<&str>, all_versions: bool) -> Result<Vec<Artifact>> {
        let current_versions = self.versions.list_all_current().await?;

        let mut groups: HashMap<(String, String), Vec<ArtifactId>> = HashMap::new();
        for version in &current_versions {
            let folder = version
                .folder_id
                .clone()
                .unwrap_or_else(|| ORPHANED_ARTIFACTS_FOLDER.to_owned());
            if let Some(wanted) = folder_id {
                if folder != wanted {
                    continue;
                }
            }
            let key = (folder, version.artifact_id.artifact_type_str().to_owned());
            groups.entry(key).or_default().push(version.artifact_id.clone());
        }

        let mut artifacts = Vec::new();
        for ((_, artifact_type_str), ids) in groups {
            let artifact_type = ArtifactType::new(artifact_type_str);
            for artifact_id in ids {
                if all_versions {
                    let mut history = self.versions.get_versions(&artifact_id).await?;
                    history.sort_by_key(|v| v.version_number);
                    for version in history {
                        artifacts.push(artifact_from_version(artifact_id.clone(), artifact_type.clone(), version));
                    }
                } else if let Some(current) = self.versions.get_current(&artifact_id).await? {
                    artifacts.push(artifact_from_version(artifact_id, artifact_type.clone(), current));
                }
            }
        }

        Ok(artifacts)
    }
}
