//! End-to-end scenarios over [`GenerationOrchestrator`], wired with
//! in-memory providers and on-disk stores, exercising the happy path, the
//! repair loop, ladder exhaustion, folder scoping, and cancellation.

use std::sync::Arc;
use std::time::Duration;

use kiln_application::config::KilnConfig;
use kiln_application::use_cases::{
    CancelOutcome, GenerationOrchestrator, GenerationRequest, JobTable,
};
use kiln_domain::entities::JobStatus;
use kiln_domain::value_objects::{ArtifactType, FolderId};
use kiln_infrastructure::events::InProcessEventBus;
use kiln_infrastructure::hard_negatives::FileHardNegativeStore;
use kiln_infrastructure::pool::FilePool;
use kiln_infrastructure::versions::FileVersionStore;
use kiln_providers::{InMemoryContextProvider, InMemoryModelBackend, InMemoryNotesProvider, ScriptedResponse};

const VALID_ERD: &str = "erDiagram\nUser {\nint id PK\n}\nOrder {\nint id PK\n}\nUser ||--o{ Order : places";
const INVALID_ERD: &str = "just some prose, no dialect keyword here";

fn orchestrator_with(
    dir: &std::path::Path,
    config: KilnConfig,
    backend: Arc<InMemoryModelBackend>,
) -> (Arc<GenerationOrchestrator>, Arc<JobTable>) {
    let jobs = Arc::new(JobTable::new(config.jobs.max_jobs, config.jobs.retention_secs));
    let config = Arc::new(config);
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        backend,
        Arc::new(InMemoryContextProvider::new()),
        Arc::new(InMemoryNotesProvider::new()),
        None,
        None,
        Arc::new(InProcessEventBus::new(config.event_bus.buffer_size)),
        Arc::new(FileVersionStore::new(dir, config.versions.max_versions_per_id)),
        Arc::new(FilePool::new(dir, config.thresholds.pool_admission_floor)),
        Arc::new(FileHardNegativeStore::new(dir)),
        Arc::clone(&jobs),
        config,
    ));
    (orchestrator, jobs)
}

#[tokio::test]
async fn happy_path_completes_with_a_valid_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(InMemoryModelBackend::new());
    backend.script("local-default", [ScriptedResponse::Content(VALID_ERD.to_owned())]);
    let (orchestrator, _jobs) = orchestrator_with(dir.path(), KilnConfig::default(), backend);

    let job_id = orchestrator
        .submit(GenerationRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            notes: Some("design users and orders".to_owned()),
            folder_id: None,
            context_id: None,
            use_validation: None,
            max_retries: None,
        })
        .await
        .unwrap();

    let (status, artifact) = orchestrator.await_job(job_id, Duration::from_secs(5)).await;
    assert_eq!(status, JobStatus::Completed);
    let artifact = artifact.expect("completed job must hydrate an artifact");
    assert!(artifact.validation.is_valid);
    assert_eq!(artifact.validation.score, 100);
}

#[tokio::test]
async fn repair_loop_recovers_after_an_invalid_first_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(InMemoryModelBackend::new());
    backend.script(
        "local-default",
        [
            ScriptedResponse::Content(INVALID_ERD.to_owned()),
            ScriptedResponse::Content(VALID_ERD.to_owned()),
        ],
    );
    let (orchestrator, _jobs) = orchestrator_with(dir.path(), KilnConfig::default(), backend);

    let job_id = orchestrator
        .submit(GenerationRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            notes: Some("design users and orders".to_owned()),
            folder_id: None,
            context_id: None,
            use_validation: None,
            max_retries: None,
        })
        .await
        .unwrap();

    let (status, artifact) = orchestrator.await_job(job_id, Duration::from_secs(5)).await;
    assert_eq!(status, JobStatus::Completed);
    let artifact = artifact.unwrap();
    assert_eq!(artifact.content, VALID_ERD);

    let job = orchestrator.get_job(job_id).unwrap();
    assert_eq!(job.attempts.len(), 2);
    assert!(!job.attempts[0].is_repair);
    assert!(job.attempts[1].is_repair);
}

#[tokio::test]
async fn ladder_exhaustion_surfaces_validation_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(InMemoryModelBackend::new());
    backend.script(
        "local-default",
        std::iter::repeat_n(ScriptedResponse::Content(INVALID_ERD.to_owned()), 6),
    );
    let mut config = KilnConfig::default();
    config.retry.max_retries = 2;
    let (orchestrator, _jobs) = orchestrator_with(dir.path(), config, backend);

    let job_id = orchestrator
        .submit(GenerationRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            notes: Some("design users and orders".to_owned()),
            folder_id: None,
            context_id: None,
            use_validation: None,
            max_retries: None,
        })
        .await
        .unwrap();

    let (status, artifact) = orchestrator.await_job(job_id, Duration::from_secs(5)).await;
    assert_eq!(status, JobStatus::Failed);
    assert!(artifact.is_none());

    let job = orchestrator.get_job(job_id).unwrap();
    let error = job.error.expect("failed job must record an error message");
    assert!(error.contains("validation below threshold") || error.contains("quality bar"));
}

#[tokio::test]
async fn folder_scoped_notes_resolve_when_no_inline_notes_supplied() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(InMemoryModelBackend::new());
    backend.script("local-default", [ScriptedResponse::Content(VALID_ERD.to_owned())]);

    let jobs = Arc::new(JobTable::new(100, 3600));
    let config = Arc::new(KilnConfig::default());
    let notes_provider = Arc::new(InMemoryNotesProvider::new());
    notes_provider.seed("design-docs", ["users have many orders".to_owned()]);

    let orchestrator = Arc::new(GenerationOrchestrator::new(
        backend,
        Arc::new(InMemoryContextProvider::new()),
        notes_provider,
        None,
        None,
        Arc::new(InProcessEventBus::new(config.event_bus.buffer_size)),
        Arc::new(FileVersionStore::new(dir.path(), config.versions.max_versions_per_id)),
        Arc::new(FilePool::new(dir.path(), config.thresholds.pool_admission_floor)),
        Arc::new(FileHardNegativeStore::new(dir.path())),
        Arc::clone(&jobs),
        config,
    ));

    let job_id = orchestrator
        .submit(GenerationRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            notes: None,
            folder_id: Some(FolderId::new("design-docs")),
            context_id: None,
            use_validation: None,
            max_retries: None,
        })
        .await
        .unwrap();

    let (status, artifact) = orchestrator.await_job(job_id, Duration::from_secs(5)).await;
    assert_eq!(status, JobStatus::Completed);
    assert_eq!(artifact.unwrap().folder_id.as_deref(), Some("design-docs"));
}

#[tokio::test]
async fn cancellation_before_generation_stops_the_job_without_a_completion_event() {
    let dir = tempfile::tempdir().unwrap();
    // No scripted response at all: if the worker reaches generation, the
    // unscripted fallback would still "succeed", so a completed status here
    // would prove cancellation was not honored.
    let backend = Arc::new(InMemoryModelBackend::new());
    let (orchestrator, jobs) = orchestrator_with(dir.path(), KilnConfig::default(), backend);

    let job_id = orchestrator
        .submit(GenerationRequest {
            artifact_type: ArtifactType::new("mermaid_erd"),
            notes: Some("design users and orders".to_owned()),
            folder_id: None,
            context_id: None,
            use_validation: None,
            max_retries: None,
        })
        .await
        .unwrap();

    assert_eq!(orchestrator.cancel(job_id), CancelOutcome::Ok);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let job = jobs.get(job_id).expect("cancelled job is still tracked");
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(orchestrator.cancel(job_id), CancelOutcome::NotCancellable);
}
