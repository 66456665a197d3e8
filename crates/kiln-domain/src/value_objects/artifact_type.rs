//! Artifact type identity.

use serde::{Deserialize, Serialize};

/// The type of artifact requested (e.g. `mermaid_erd`, `api_docs`,
/// `code_prototype`). Kept as an open string rather than a closed enum: new
/// dialects are configuration-driven, not a recompile, mirroring
/// `mcb_domain::ports::jobs::JobType::Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactType(String);

impl ArtifactType {
    /// Wrap a raw artifact-type string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if this type belongs to the `mermaid_*` family.
    #[must_use]
    pub fn is_mermaid(&self) -> bool {
        self.0.starts_with("mermaid_")
    }

    /// `true` if this type belongs to the `html_*` family, or is one of the
    /// known HTML-producing aliases.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.0.starts_with("html_")
            || self.0 == "dev_visual_prototype"
            || self.0 == "html_prototype"
    }

    /// Normalized validator family: strips a leading `mermaid_` prefix and
    /// maps known aliases onto the canonical rule-set key used by
    /// [`crate`]'s validator dispatch table.
    #[must_use]
    pub fn validator_family(&self) -> &str {
        let stripped = self.0.strip_prefix("mermaid_").unwrap_or(&self.0);
        match stripped {
            "erd" => "erd",
            "architecture" | "flowchart" | "graph" | "system_overview" | "data_flow"
            | "components_diagram" | "workflows" => "flowchart",
            "sequence" | "api_sequence" => "sequence",
            "api_docs" => "api_docs",
            "jira" | "stories" | "user_stories" => "jira",
            "code_prototype" => "code_prototype",
            _ if self.is_html() => "html_prototype",
            _ => "generic",
        }
    }

    /// Complexity weight used by the curriculum learner and difficulty
    /// estimator, grounded on `DifficultyEstimator.ARTIFACT_COMPLEXITY`.
    #[must_use]
    pub fn complexity_weight(&self) -> f64 {
        match self.validator_family() {
            "erd" => 0.3,
            "data_flow" | "sequence" => 0.5,
            "flowchart" => 0.6,
            "jira" => 0.4,
            "api_docs" => 0.5,
            "html_prototype" => 0.7,
            "code_prototype" => 0.8,
            _ => 0.5,
        }
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtifactType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtifactType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_mermaid_family() {
        let t = ArtifactType::new("mermaid_erd");
        assert!(t.is_mermaid());
        assert_eq!(t.validator_family(), "erd");
    }

    #[test]
    fn recognizes_html_aliases() {
        assert!(ArtifactType::new("html_prototype").is_html());
        assert!(ArtifactType::new("dev_visual_prototype").is_html());
        assert_eq!(
            ArtifactType::new("dev_visual_prototype").validator_family(),
            "html_prototype"
        );
    }

    #[test]
    fn unknown_types_fall_back_to_generic() {
        assert_eq!(ArtifactType::new("something_else").validator_family(), "generic");
    }
}
