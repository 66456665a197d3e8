//! Artifact generation orchestrator — composition root.
//!
//! Re-exports the domain/application public API and wires the default
//! disk-backed stores plus in-memory providers into a single [`Kiln`]
//! facade. Nothing outside this crate reaches across layers directly:
//! `kiln-application` depends only on `kiln-domain`'s ports, and
//! `kiln-infrastructure`/`kiln-providers` supply the implementations
//! assembled here.

pub mod bootstrap;

pub use bootstrap::{Collaborators, Kiln};

pub use kiln_application::config::KilnConfig;
pub use kiln_application::use_cases::{
    CancelOutcome, GenerationRequest, RecordFeedbackRequest, RecordFeedbackResult, TrainingReadiness,
};
pub use kiln_domain::entities::{Artifact, ArtifactValidation, Job, JobStatus};
pub use kiln_domain::events::JobEvent;
pub use kiln_domain::value_objects::{ArtifactId, ArtifactType, FolderId, JobId};
pub use kiln_domain::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_domain::entities::FeedbackType;
    use kiln_providers::{InMemoryModelBackend, ScriptedResponse};
    use std::sync::Arc;
    use std::time::Duration;

    fn collaborators_with_scripted_backend(dir: &std::path::Path, config: &KilnConfig) -> Collaborators {
        let backend = Arc::new(InMemoryModelBackend::new());
        backend.script(
            "local-default",
            [ScriptedResponse::Content("erDiagram\n    A ||--o{ B : has".into())],
        );
        Collaborators {
            backend,
            ..Collaborators::defaults(dir, config)
        }
    }

    #[tokio::test]
    async fn submit_and_await_a_generation_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(KilnConfig::default());
        let collaborators = collaborators_with_scripted_backend(dir.path(), &config);
        let kiln = Kiln::from_parts(collaborators, config);

        let job_id = kiln
            .orchestrator
            .submit(GenerationRequest {
                artifact_type: ArtifactType::new("mermaid_erd"),
                notes: Some("design the A-to-B relationship".to_owned()),
                folder_id: None,
                context_id: None,
                use_validation: None,
                max_retries: None,
            })
            .await
            .unwrap();

        let (status, artifact) = kiln.orchestrator.await_job(job_id, Duration::from_secs(5)).await;
        assert_eq!(status, JobStatus::Completed);
        let artifact = artifact.unwrap();
        assert!(artifact.content.starts_with("erDiagram"));
    }

    #[tokio::test]
    async fn record_feedback_round_trips_through_the_facade() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(KilnConfig::default());
        let collaborators = Collaborators::defaults(dir.path(), &config);
        let kiln = Kiln::from_parts(collaborators, config);

        let result = kiln
            .feedback
            .record_feedback(RecordFeedbackRequest {
                artifact_id: ArtifactId::from_raw("mermaid_erd"),
                artifact_type: ArtifactType::new("mermaid_erd"),
                ai_output: "erDiagram\n    A ||--o{ B : has".to_owned(),
                validation_score: Some(90),
                feedback_type: FeedbackType::Positive,
                corrected_output: None,
                context: serde_json::json!({}),
                is_generic_content: false,
            })
            .await
            .unwrap();

        assert!(result.event_recorded);
    }
}
