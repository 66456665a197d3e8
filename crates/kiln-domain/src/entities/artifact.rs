//! Artifact entity: the generated, typed deliverable.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ArtifactId, ArtifactType};

/// Validation summary carried alongside an artifact's content (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactValidation {
    /// Validator score in `[0, 100]`.
    pub score: u8,
    /// Whether the artifact passed the validator's `is_valid` threshold.
    pub is_valid: bool,
    /// Validator errors, if any.
    pub errors: Vec<String>,
    /// Validator warnings, if any.
    pub warnings: Vec<String>,
}

/// A generated, typed deliverable — the current-version view of an
/// `artifact_id`'s history (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Stable logical identity.
    pub artifact_id: ArtifactId,
    /// The artifact's type.
    pub artifact_type: ArtifactType,
    /// Cleaned, canonical content.
    pub content: String,
    /// Unix-epoch-seconds generation time.
    pub generated_at: i64,
    /// The model that produced this content (or `manual_edit`).
    pub model_used: String,
    /// Validation summary for this content.
    pub validation: ArtifactValidation,
    /// Rendered HTML companion, for `mermaid_*` types that opted into the
    /// HTML post-pass (§3, §4.1 step 6d).
    pub html_content: Option<String>,
    /// The folder this artifact is scoped to, if any.
    pub folder_id: Option<String>,
}
