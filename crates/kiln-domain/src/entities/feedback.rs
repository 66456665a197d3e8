//! Feedback entity: human judgment on a generated artifact.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ArtifactId, ArtifactType};

/// The kind of feedback recorded against an artifact (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// The artifact was accepted as-is.
    Positive,
    /// The artifact was rejected outright.
    Negative,
    /// The artifact was edited by a human; the edit itself is training signal.
    Correction,
    /// The artifact failed validation before a human ever saw it.
    ValidationFailure,
    /// The artifact was accepted without any edits (ladder success signal).
    Success,
}

impl FeedbackType {
    /// Score used when a caller does not supply an explicit score (§4.6).
    #[must_use]
    pub fn normalized_default_score(self) -> u8 {
        match self {
            Self::Positive => 85,
            Self::Correction => 85,
            Self::Negative => 60,
            Self::ValidationFailure | Self::Success => 70,
        }
    }
}

/// A single append-only feedback record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// The artifact this feedback is about.
    pub artifact_id: ArtifactId,
    /// The artifact's type, denormalized for pool/training bookkeeping.
    pub artifact_type: ArtifactType,
    /// The kind of feedback.
    pub feedback_type: FeedbackType,
    /// Normalized score in `[0, 100]`.
    pub score: u8,
    /// The original AI output being judged.
    pub ai_output: String,
    /// The human-corrected content, if `feedback_type == Correction`.
    pub corrected_content: Option<String>,
    /// Unix-epoch-seconds timestamp.
    pub timestamp: i64,
    /// Arbitrary context (notes excerpt, RAG source counts, …) used by
    /// downstream difficulty/complexity estimation.
    pub context: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scores_match_spec() {
        assert_eq!(FeedbackType::Positive.normalized_default_score(), 85);
        assert_eq!(FeedbackType::Correction.normalized_default_score(), 85);
        assert_eq!(FeedbackType::Negative.normalized_default_score(), 60);
        assert_eq!(
            FeedbackType::ValidationFailure.normalized_default_score(),
            70
        );
    }
}
