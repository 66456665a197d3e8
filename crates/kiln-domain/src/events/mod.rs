//! Job-scoped event types published on the Event Bus (§4.5).

use serde::{Deserialize, Serialize};

use crate::entities::Artifact;
use crate::value_objects::{ArtifactId, JobId};

/// One event in a job's event stream. Ordering within a job: `Started`
/// precedes any `Progress`/`Chunk`; those precede the terminal event
/// (`Complete` or `Error`); there is exactly one terminal (§5, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEvent {
    /// The worker began executing the job.
    Started {
        /// The job this event belongs to.
        job_id: JobId,
    },
    /// A progress update.
    Progress {
        /// The job this event belongs to.
        job_id: JobId,
        /// Progress percentage in `[0, 100]`.
        progress: u8,
        /// Human-readable status message.
        message: String,
        /// Quality-predictor forecast, attached at the "quality forecast"
        /// milestone only.
        quality_prediction: Option<QualityPredictionEvent>,
    },
    /// A streamed token chunk from a model backend.
    Chunk {
        /// The job this event belongs to.
        job_id: JobId,
        /// The streamed text fragment.
        chunk: String,
    },
    /// Terminal success.
    Complete {
        /// The job this event belongs to.
        job_id: JobId,
        /// The artifact produced.
        artifact_id: ArtifactId,
        /// The final validator score.
        validation_score: u8,
        /// Whether the final candidate passed validation.
        is_valid: bool,
        /// The full artifact payload.
        artifact: Artifact,
    },
    /// Terminal failure.
    Error {
        /// The job this event belongs to.
        job_id: JobId,
        /// A user-facing error summary.
        error: String,
    },
}

impl JobEvent {
    /// The job id every variant carries.
    #[must_use]
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Started { job_id }
            | Self::Progress { job_id, .. }
            | Self::Chunk { job_id, .. }
            | Self::Complete { job_id, .. }
            | Self::Error { job_id, .. } => *job_id,
        }
    }

    /// `true` if this event ends a job's stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Quality-predictor forecast payload carried on the `quality_forecast`
/// progress event (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityPredictionEvent {
    /// `low` / `medium` / `high`.
    pub label: String,
    /// Underlying score in `[0, 1]`.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_events() {
        let job_id = JobId::new();
        assert!(
            JobEvent::Error {
                job_id,
                error: "x".into()
            }
            .is_terminal()
        );
        assert!(!JobEvent::Started { job_id }.is_terminal());
    }
}
