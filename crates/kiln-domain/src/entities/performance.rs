//! Performance metrics entity.

use serde::{Deserialize, Serialize};

use crate::value_objects::ArtifactType;

/// A single evaluation pass recorded against a model for an artifact type
/// (§3, §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// The model evaluated.
    pub model_id: String,
    /// The artifact type evaluated.
    pub artifact_type: ArtifactType,
    /// Average validator score across the evaluation sample.
    pub avg_validation_score: f64,
    /// Fraction of samples that passed validation.
    pub success_rate: f64,
    /// Average reward across the evaluation sample.
    pub avg_reward: f64,
    /// Average latency in milliseconds.
    pub avg_latency_ms: f64,
    /// Number of samples the averages were computed over.
    pub n_samples: usize,
    /// Unix-epoch-seconds timestamp.
    pub timestamp: i64,
}

impl PerformanceMetrics {
    /// Dominance order used to update the best-per-type pointer: higher
    /// `avg_validation_score` wins; ties broken by higher `success_rate`;
    /// remaining ties broken by lower `avg_latency_ms` (§4.8).
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        use std::cmp::Ordering;
        match self
            .avg_validation_score
            .partial_cmp(&other.avg_validation_score)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self
                .success_rate
                .partial_cmp(&other.success_rate)
                .unwrap_or(Ordering::Equal)
            {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => self.avg_latency_ms < other.avg_latency_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(score: f64, success: f64, latency: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            model_id: "m".into(),
            artifact_type: ArtifactType::new("mermaid_erd"),
            avg_validation_score: score,
            success_rate: success,
            avg_reward: 0.0,
            avg_latency_ms: latency,
            n_samples: 10,
            timestamp: 0,
        }
    }

    #[test]
    fn higher_score_dominates() {
        assert!(metrics(90.0, 0.5, 100.0).dominates(&metrics(80.0, 0.9, 50.0)));
    }

    #[test]
    fn tie_on_score_breaks_on_success_rate() {
        assert!(metrics(90.0, 0.9, 100.0).dominates(&metrics(90.0, 0.8, 10.0)));
    }

    #[test]
    fn tie_on_score_and_success_breaks_on_latency() {
        assert!(metrics(90.0, 0.9, 50.0).dominates(&metrics(90.0, 0.9, 100.0)));
        assert!(!metrics(90.0, 0.9, 150.0).dominates(&metrics(90.0, 0.9, 100.0)));
    }
}
