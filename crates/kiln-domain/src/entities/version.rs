//! Version entity: an immutable snapshot owned by the Version Store.

use serde::{Deserialize, Serialize};

use crate::value_objects::ArtifactId;

/// Metadata attached to a version at creation time. Kept as a free-form
/// JSON object (rather than a closed struct) because callers attach
/// different keys depending on provenance (`model_used`, `validation_score`,
/// `attempts`, `restored_from`, `update_type`, …) — mirrors the teacher's use
/// of `serde_json::Value` metadata bags in `ports/jobs.rs::JobResult`.
pub type VersionMetadata = serde_json::Map<String, serde_json::Value>;

/// An immutable snapshot of an artifact's content plus metadata (§3).
///
/// Exactly one [`Version`] per `artifact_id` has `is_current = true`
/// (§3 invariants, §8 "single current").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// The logical artifact this version belongs to.
    pub artifact_id: ArtifactId,
    /// Monotonic per-id version number, starting at 1.
    pub version_number: u32,
    /// The version's content.
    pub content: String,
    /// Arbitrary provenance metadata.
    pub metadata: VersionMetadata,
    /// Unix-epoch-seconds creation time.
    pub created_at: i64,
    /// `true` iff this is the authoritative current version for its id.
    pub is_current: bool,
    /// The folder this version is scoped to, if any.
    pub folder_id: Option<String>,
}

/// Summary produced by `Compare(artifact_id, n1, n2)` (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDiffSummary {
    /// Byte length of the first version's content.
    pub size_a: usize,
    /// Byte length of the second version's content.
    pub size_b: usize,
    /// Line count of the first version's content.
    pub lines_a: usize,
    /// Line count of the second version's content.
    pub lines_b: usize,
    /// Similarity in `[0, 1]`, by token overlap.
    pub similarity: f64,
}
