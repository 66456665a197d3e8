//! In-memory job tracking state for the Generation Orchestrator (§5 "job
//! table"). Concrete, non-swappable process state — unlike the Version
//! Store or Feedback Store, the job table is never persisted, so it isn't
//! exposed as a domain port; grounded on the teacher's
//! `mcb_domain::ports::jobs::JobManagerInterface` shape, adapted to
//! `dashmap` + async access for this crate's tokio runtime.

use std::sync::Arc;

use dashmap::DashMap;
use kiln_domain::entities::{Attempt, Job, JobStatus};
use kiln_domain::value_objects::{ArtifactId, JobId};
use tokio_util::sync::CancellationToken;

/// Bounded, dashmap-backed table of in-flight and recently-terminal jobs.
pub struct JobTable {
    jobs: DashMap<JobId, Job>,
    cancellation: DashMap<JobId, CancellationToken>,
    max_jobs: usize,
    retention_secs: i64,
}

impl JobTable {
    /// Create an empty table bounded by `max_jobs` and `retention_secs`
    /// (§5, [`crate::config::JobTableConfig`]).
    #[must_use]
    pub fn new(max_jobs: usize, retention_secs: i64) -> Self {
        Self {
            jobs: DashMap::new(),
            cancellation: DashMap::new(),
            max_jobs,
            retention_secs,
        }
    }

    /// Insert a freshly-submitted job and hand back its cancellation token.
    pub fn insert(&self, job: Job) -> CancellationToken {
        let token = CancellationToken::new();
        self.cancellation.insert(job.id, token.clone());
        self.jobs.insert(job.id, job);
        token
    }

    /// Fetch a snapshot of a job's current state.
    #[must_use]
    pub fn get(&self, job_id: JobId) -> Option<Job> {
        self.jobs.get(&job_id).map(|j| j.clone())
    }

    /// Snapshot of up to `limit` jobs, newest first.
    #[must_use]
    pub fn list(&self, limit: usize) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|e| e.value().clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        jobs
    }

    /// Mutate a job in place, if it still exists.
    pub fn update(&self, job_id: JobId, f: impl FnOnce(&mut Job)) {
        if let Some(mut job) = self.jobs.get_mut(&job_id) {
            f(&mut job);
        }
    }

    /// Record progress toward completion (§4.1 step 3-5 `progress` events).
    pub fn set_progress(&self, job_id: JobId, progress: u8, message: Option<String>) {
        self.update(job_id, |job| {
            job.progress = progress;
            job.message = message;
        });
    }

    /// Record the pre-generation quality forecast (§4.1 step 3).
    pub fn set_quality_forecast(&self, job_id: JobId, label: String, score: f64) {
        self.update(job_id, |job| {
            job.quality_forecast = Some((label, score));
        });
    }

    /// Append one ladder attempt record (§4.1.1).
    pub fn push_attempt(&self, job_id: JobId, attempt: Attempt) {
        self.update(job_id, |job| job.attempts.push(attempt));
    }

    /// Transition a job to `completed` with its resulting artifact id.
    pub fn complete(&self, job_id: JobId, artifact_id: ArtifactId, completed_at: i64) {
        self.update(job_id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.artifact_id = Some(artifact_id);
            job.completed_at = Some(completed_at);
        });
    }

    /// Transition a job to `failed` with an error message (§4.1 step 7).
    pub fn fail(&self, job_id: JobId, error: String, completed_at: i64) {
        self.update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
            job.completed_at = Some(completed_at);
        });
    }

    /// Request cancellation. Returns `not_found` if the job is unknown,
    /// `not_cancellable` if it's already terminal, `ok` otherwise (§4.1
    /// `Cancel`).
    #[must_use]
    pub fn cancel(&self, job_id: JobId, completed_at: i64) -> CancelOutcome {
        let Some(mut job) = self.jobs.get_mut(&job_id) else {
            return CancelOutcome::NotFound;
        };
        if job.status.is_terminal() {
            return CancelOutcome::NotCancellable;
        }
        job.status = JobStatus::Cancelled;
        job.completed_at = Some(completed_at);
        drop(job);
        if let Some(token) = self.cancellation.get(&job_id) {
            token.cancel();
        }
        CancelOutcome::Ok
    }

    /// The cancellation token for a job, if it's still tracked.
    #[must_use]
    pub fn cancellation_token(&self, job_id: JobId) -> Option<CancellationToken> {
        self.cancellation.get(&job_id).map(|t| t.clone())
    }

    /// Evict terminal jobs older than `retention_secs`, then trim down to
    /// `max_jobs` by oldest-first if still over budget (§5 janitor sweep).
    pub fn evict_expired(&self, now: i64) {
        let expired: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|e| {
                e.value().status.is_terminal()
                    && e.value()
                        .completed_at
                        .is_some_and(|completed| now - completed > self.retention_secs)
            })
            .map(|e| *e.key())
            .collect();
        for id in expired {
            self.jobs.remove(&id);
            self.cancellation.remove(&id);
        }

        if self.jobs.len() > self.max_jobs {
            let mut by_age: Vec<(JobId, i64)> = self.jobs.iter().map(|e| (*e.key(), e.value().created_at)).collect();
            by_age.sort_by_key(|(_, created_at)| *created_at);
            let overflow = self.jobs.len() - self.max_jobs;
            for (id, _) in by_age.into_iter().take(overflow) {
                self.jobs.remove(&id);
                self.cancellation.remove(&id);
            }
        }
    }
}

/// Outcome of a [`JobTable::cancel`] request (§4.1 `Cancel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was in-flight and is now cancelled.
    Ok,
    /// No job with that id is tracked.
    NotFound,
    /// The job already reached a terminal state.
    NotCancellable,
}

/// Shared handle type used throughout the application layer.
pub type SharedJobTable = Arc<JobTable>;

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_domain::value_objects::ArtifactType;

    fn job(id: JobId) -> Job {
        let mut j = Job::new(ArtifactType::new("mermaid_erd"), None, "notes".to_owned(), 0);
        j.id = id;
        j
    }

    #[test]
    fn insert_and_get_round_trips() {
        let table = JobTable::new(10, 3600);
        let id = JobId::new();
        table.insert(job(id));
        assert!(table.get(id).is_some());
    }

    #[test]
    fn cancel_unknown_job_reports_not_found() {
        let table = JobTable::new(10, 3600);
        assert_eq!(table.cancel(JobId::new(), 0), CancelOutcome::NotFound);
    }

    #[test]
    fn cancel_terminal_job_reports_not_cancellable() {
        let table = JobTable::new(10, 3600);
        let id = JobId::new();
        table.insert(job(id));
        table.complete(id, ArtifactId::from_raw("mermaid_erd"), 1);
        assert_eq!(table.cancel(id, 2), CancelOutcome::NotCancellable);
    }

    #[test]
    fn cancel_in_flight_job_triggers_token() {
        let table = JobTable::new(10, 3600);
        let id = JobId::new();
        let token = table.insert(job(id));
        assert_eq!(table.cancel(id, 1), CancelOutcome::Ok);
        assert!(token.is_cancelled());
    }

    #[test]
    fn eviction_removes_old_terminal_jobs_only() {
        let table = JobTable::new(10, 100);
        let old_id = JobId::new();
        table.insert(job(old_id));
        table.complete(old_id, ArtifactId::from_raw("mermaid_erd"), 0);

        let fresh_id = JobId::new();
        table.insert(job(fresh_id));

        table.evict_expired(1000);
        assert!(table.get(old_id).is_none());
        assert!(table.get(fresh_id).is_some());
    }

    #[test]
    fn list_caps_at_limit_and_orders_newest_first() {
        let table = JobTable::new(10, 3600);
        for i in 0..5 {
            let id = JobId::new();
            let mut j = job(id);
            j.created_at = i;
            table.insert(j);
        }
        let listed = table.list(2);
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
    }
}
