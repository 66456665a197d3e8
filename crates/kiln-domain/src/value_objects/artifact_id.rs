//! Stable logical artifact identity.

use serde::{Deserialize, Serialize};

use super::ArtifactType;

/// Stable logical name for an artifact: `folder_id::artifact_type` when a
/// folder is bound, else `artifact_type` alone. This is the key under which
/// the Version Store owns history (§3, §6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Build the stable id per the identifier rule in spec §6.
    pub fn new(folder_id: Option<&str>, artifact_type: &ArtifactType) -> Self {
        match folder_id {
            Some(folder) if !folder.is_empty() => {
                Self(format!("{folder}::{}", artifact_type.as_str()))
            }
            _ => Self(artifact_type.as_str().to_owned()),
        }
    }

    /// Wrap an already-formed id string (e.g. read back from storage).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The folder component, if this id is folder-scoped.
    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        self.0.split_once("::").map(|(folder, _)| folder)
    }

    /// The artifact-type component (always present).
    #[must_use]
    pub fn artifact_type_str(&self) -> &str {
        self.0.split_once("::").map_or(&self.0, |(_, ty)| ty)
    }

    /// Filename-safe form: `:` replaced with `_`, per §4.4/§6 "sanitize `:`
    /// and other path-hostile characters".
    #[must_use]
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| if c == ':' || c == '/' || c == '\\' { '_' } else { c })
            .collect()
    }

    /// Case- and separator-insensitive match against a bare `artifact_type`
    /// prefix, used by `ListByType` (§4.4) to unify legacy
    /// (`artifact_type`-only) and newer (`folder::type`) ids.
    #[must_use]
    pub fn matches_type_prefix(&self, artifact_type: &str) -> bool {
        fn normalize(s: &str) -> String {
            s.to_ascii_lowercase().replace(['-', ' '], "_")
        }
        let haystack = normalize(self.artifact_type_str());
        let needle = normalize(artifact_type);
        haystack == needle
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sentinel folder name used to group legacy/unscoped artifacts when listing
/// (§6 `ListArtifacts`, §9 "artifact-id cohabitation").
pub const ORPHANED_ARTIFACTS_FOLDER: &str = "Orphaned Artifacts";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_scoped_id() {
        let ty = ArtifactType::new("mermaid_erd");
        let id = ArtifactId::new(Some("alpha"), &ty);
        assert_eq!(id.as_str(), "alpha::mermaid_erd");
        assert_eq!(id.folder_id(), Some("alpha"));
        assert_eq!(id.artifact_type_str(), "mermaid_erd");
    }

    #[test]
    fn unscoped_id_is_bare_type() {
        let ty = ArtifactType::new("mermaid_erd");
        let id = ArtifactId::new(None, &ty);
        assert_eq!(id.as_str(), "mermaid_erd");
        assert_eq!(id.folder_id(), None);
    }

    #[test]
    fn sanitized_replaces_colon() {
        let ty = ArtifactType::new("mermaid_erd");
        let id = ArtifactId::new(Some("alpha"), &ty);
        assert_eq!(id.sanitized(), "alpha__mermaid_erd");
    }

    #[test]
    fn type_prefix_match_is_separator_insensitive() {
        let id = ArtifactId::from_raw("alpha::mermaid-erd");
        assert!(id.matches_type_prefix("mermaid_erd"));
        assert!(id.matches_type_prefix("Mermaid ERD".replace(' ', "_")));
    }
}
