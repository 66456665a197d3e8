//! Job entity and lifecycle.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ArtifactId, ArtifactType, FolderId, JobId};

/// Lifecycle status of a generation job (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// The worker is still driving the retry/fallback ladder.
    InProgress,
    /// The worker produced and persisted an accepted artifact.
    Completed,
    /// The worker exhausted its ladder or hit an unrecoverable error.
    Failed,
    /// The job was cancelled before reaching a terminal outcome.
    Cancelled,
}

impl JobStatus {
    /// `true` if this status is terminal (no further events will be emitted).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// One recorded attempt on the retry/fallback ladder (§4.1.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// The model id this attempt was run against.
    pub model_id: String,
    /// The validator's score for this attempt's cleaned content, if it got
    /// that far (a `ModelUnavailable`/`ModelTimeout`/`ModelError` attempt
    /// never reaches validation).
    pub validation_score: Option<u8>,
    /// Validator errors for this attempt, if validated.
    pub errors: Vec<String>,
    /// Whether this attempt was a repair re-prompt on the same rung.
    pub is_repair: bool,
}

/// A generation job tracked in memory for the lifetime of its run (§3).
///
/// The job table is the durable source of truth for jobs *only while they
/// are in memory*; terminal jobs are eventually evicted and are not
/// reconstructed from disk (§9 "source of truth ambiguity").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque unique identifier.
    pub id: JobId,
    /// The artifact type requested.
    pub artifact_type: ArtifactType,
    /// The folder this job is scoped to, if any.
    pub folder_id: Option<FolderId>,
    /// Meeting notes supplied or resolved for this job.
    pub notes: String,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Progress percentage in `[0, 100]`.
    pub progress: u8,
    /// Most recent progress message.
    pub message: Option<String>,
    /// Quality-predictor forecast, attached once computed.
    pub quality_forecast: Option<(String, f64)>,
    /// Unix-epoch-seconds creation time.
    pub created_at: i64,
    /// Unix-epoch-seconds completion time, once terminal.
    pub completed_at: Option<i64>,
    /// All ladder attempts recorded so far.
    pub attempts: Vec<Attempt>,
    /// The artifact id this job produced, once known.
    pub artifact_id: Option<ArtifactId>,
    /// Error summary, populated only on `Failed`.
    pub error: Option<String>,
}

impl Job {
    /// Construct a freshly submitted job in `InProgress` status.
    pub fn new(
        artifact_type: ArtifactType,
        folder_id: Option<FolderId>,
        notes: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id: JobId::new(),
            artifact_type,
            folder_id,
            notes: notes.into(),
            status: JobStatus::InProgress,
            progress: 0,
            message: None,
            quality_forecast: None,
            created_at: now,
            completed_at: None,
            attempts: Vec::new(),
            artifact_id: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn new_job_starts_in_progress() {
        let job = Job::new(ArtifactType::new("mermaid_erd"), None, "notes", 0);
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.progress, 0);
        assert!(job.artifact_id.is_none());
    }
}
