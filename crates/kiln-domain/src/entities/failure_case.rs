//! Failure case entity: input to the hard-negative miner.

use serde::{Deserialize, Serialize};

use crate::value_objects::ArtifactType;

/// A captured low-score generation, feeding the hard-negative miner (§3).
/// Captured whenever a validator result scores below 75, regardless of
/// whether the job ultimately succeeded on a later rung (SPEC_FULL §2
/// supplemented feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureCase {
    /// The artifact type that failed.
    pub artifact_type: ArtifactType,
    /// The input (meeting notes) that produced the failure.
    pub input: String,
    /// The model's raw/cleaned output that failed.
    pub output: String,
    /// The validator's score for this output.
    pub validation_score: u8,
    /// A short label for the dominant failure mode (e.g. `missing_keyword`,
    /// `unbalanced_braces`, `too_short`).
    pub failure_type: String,
    /// Complexity factors contributing to difficulty (input length ratio,
    /// context size ratio, …), averaged by the hard-negative miner.
    pub complexity_factors: Vec<f64>,
    /// Unix-epoch-seconds timestamp.
    pub timestamp: i64,
}

impl FailureCase {
    /// Difficulty combines inverse validation score and average complexity
    /// factor (§4.7.4).
    #[must_use]
    pub fn difficulty(&self) -> f64 {
        let inverse_score = 1.0 - f64::from(self.validation_score) / 100.0;
        let avg_complexity = if self.complexity_factors.is_empty() {
            0.0
        } else {
            self.complexity_factors.iter().sum::<f64>() / self.complexity_factors.len() as f64
        };
        ((inverse_score + avg_complexity) / 2.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_increases_with_lower_score() {
        let easy = FailureCase {
            artifact_type: ArtifactType::new("mermaid_erd"),
            input: String::new(),
            output: String::new(),
            validation_score: 70,
            failure_type: "weak".into(),
            complexity_factors: vec![0.2],
            timestamp: 0,
        };
        let hard = FailureCase {
            validation_score: 10,
            complexity_factors: vec![0.9],
            ..easy.clone()
        };
        assert!(hard.difficulty() > easy.difficulty());
    }
}
