//! Generation Orchestrator (§4.1): `Submit`/`Await`/`Stream`/`GetJob`/
//! `ListJobs`/`Cancel`, the worker algorithm, and the retry/fallback ladder.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use kiln_domain::entities::{
    Artifact, ArtifactValidation, FailureCase, FeedbackType, Job, JobStatus, TrainingExample, TrainingExampleSource,
};
use kiln_domain::events::{JobEvent, QualityPredictionEvent};
use kiln_domain::ports::{
    ContextOptions, ContextProvider, EventBus, EventStream, FinetuningPoolPort, GenerateParams,
    HardNegativeStorePort, HtmlGenerator, ModelBackend, NotesProvider, QualityJudge, VersionStorePort,
};
use kiln_domain::value_objects::{ArtifactId, ArtifactType, FolderId, JobId};
use kiln_domain::{Error, Result};
use tokio_util::sync::CancellationToken;

use super::job_table::{CancelOutcome, SharedJobTable};
use super::ladder::{run_ladder, LadderFailure};
use crate::config::KilnConfig;
use crate::domain_services::{clean, predict_quality, validate, QualityContext};

/// A caller's request to generate one artifact (§4.1 `Submit`).
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The artifact type requested.
    pub artifact_type: ArtifactType,
    /// Inline meeting notes, if supplied directly.
    pub notes: Option<String>,
    /// The folder to resolve notes from, if `notes` is absent.
    pub folder_id: Option<FolderId>,
    /// A cached context id, forwarded opaquely to the Context Provider.
    pub context_id: Option<String>,
    /// Override the configured `use_validation` policy for this job.
    pub use_validation: Option<bool>,
    /// Override the configured `max_retries` budget for this job.
    pub max_retries: Option<u32>,
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Composition-root-wired use case driving one job from submission to a
/// terminal state (§4.1).
pub struct GenerationOrchestrator {
    backend: Arc<dyn ModelBackend>,
    context_provider: Arc<dyn ContextProvider>,
    notes_provider: Arc<dyn NotesProvider>,
    html_generator: Option<Arc<dyn HtmlGenerator>>,
    quality_judge: Option<Arc<dyn QualityJudge>>,
    event_bus: Arc<dyn EventBus>,
    versions: Arc<dyn VersionStorePort>,
    pool: Arc<dyn FinetuningPoolPort>,
    hard_negatives: Arc<dyn HardNegativeStorePort>,
    jobs: SharedJobTable,
    config: Arc<KilnConfig>,
}

impl GenerationOrchestrator {
    /// Wire an orchestrator from its collaborators (composition root).
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        context_provider: Arc<dyn ContextProvider>,
        notes_provider: Arc<dyn NotesProvider>,
        html_generator: Option<Arc<dyn HtmlGenerator>>,
        quality_judge: Option<Arc<dyn QualityJudge>>,
        event_bus: Arc<dyn EventBus>,
        versions: Arc<dyn VersionStorePort>,
        pool: Arc<dyn FinetuningPoolPort>,
        hard_negatives: Arc<dyn HardNegativeStorePort>,
        jobs: SharedJobTable,
        config: Arc<KilnConfig>,
    ) -> Self {
        Self {
            backend,
            context_provider,
            notes_provider,
            html_generator,
            quality_judge,
            event_bus,
            versions,
            pool,
            hard_negatives,
            jobs,
            config,
        }
    }

    /// Validate, allocate, and spawn a worker for `request` (§4.1 `Submit`).
    /// Non-blocking: returns as soon as the job is recorded.
    pub async fn submit(&self, request: GenerationRequest) -> Result<JobId> {
        let has_notes = request.notes.as_deref().is_some_and(|n| !n.trim().is_empty());
        if !has_notes && request.folder_id.is_none() && request.context_id.is_none() {
            return Err(Error::invalid_request(
                "one of notes, folder_id, or context_id is required",
            ));
        }

        let job = Job::new(
            request.artifact_type.clone(),
            request.folder_id.clone(),
            request.notes.clone().unwrap_or_default(),
            now_secs(),
        );
        let job_id = job.id;
        let cancellation = self.jobs.insert(job);

        let worker = Worker {
            backend: Arc::clone(&self.backend),
            context_provider: Arc::clone(&self.context_provider),
            notes_provider: Arc::clone(&self.notes_provider),
            html_generator: self.html_generator.clone(),
            quality_judge: self.quality_judge.clone(),
            event_bus: Arc::clone(&self.event_bus),
            versions: Arc::clone(&self.versions),
            pool: Arc::clone(&self.pool),
            hard_negatives: Arc::clone(&self.hard_negatives),
            jobs: Arc::clone(&self.jobs),
            config: Arc::clone(&self.config),
        };
        tokio::spawn(async move { worker.run(job_id, request, cancellation).await });

        Ok(job_id)
    }

    /// Block up to `max_wait` for the job to reach a terminal state (§4.1
    /// `Await`). On timeout, returns `(in_progress, None)` so the caller can
    /// fall back to [`Self::stream`].
    pub async fn await_job(&self, job_id: JobId, max_wait: Duration) -> (JobStatus, Option<Artifact>) {
        if let Some(job) = self.jobs.get(job_id) {
            if job.status.is_terminal() {
                let artifact = self.hydrate_artifact(&job).await;
                return (job.status, artifact);
            }
        }

        let mut stream = self.event_bus.subscribe(job_id).await;
        let saw_terminal = tokio::time::timeout(max_wait, async {
            while let Some(event) = stream.next().await {
                if event.is_terminal() {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap_or(false);

        let Some(job) = self.jobs.get(job_id) else {
            return (JobStatus::InProgress, None);
        };
        let artifact = if saw_terminal { self.hydrate_artifact(&job).await } else { None };
        (job.status, artifact)
    }

    /// Subscribe to a job's event stream (§4.1 `Stream`). Lazy and finite:
    /// terminates after the job's terminal event.
    pub async fn stream(&self, job_id: JobId) -> EventStream {
        self.event_bus.subscribe(job_id).await
    }

    /// Snapshot a job's current state (§4.1 `GetJob`).
    #[must_use]
    pub fn get_job(&self, job_id: JobId) -> Option<Job> {
        self.jobs.get(job_id)
    }

    /// List up to `limit` jobs, newest first (§4.1 `ListJobs`).
    #[must_use]
    pub fn list_jobs(&self, limit: usize) -> Vec<Job> {
        self.jobs.list(limit)
    }

    /// Request cancellation of an in-flight job (§4.1 `Cancel`).
    #[must_use]
    pub fn cancel(&self, job_id: JobId) -> CancelOutcome {
        self.jobs.cancel(job_id, now_secs())
    }

    /// Reconstruct the current [`Artifact`] for a completed job from its
    /// Version Store entry (the job table only retains the id, not the
    /// content).
    async fn hydrate_artifact(&self, job: &Job) -> Option<Artifact> {
        let artifact_id = job.artifact_id.clone()?;
        let version = self.versions.get_current(&artifact_id).await.ok().flatten()?;
        let model_used = version
            .metadata
            .get("model_used")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_owned();
        let score = version
            .metadata
            .get("validation_score")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u8;
        let is_valid = version
            .metadata
            .get("is_valid")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let html_content = version
            .metadata
            .get("html_content")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        Some(Artifact {
            artifact_id,
            artifact_type: job.artifact_type.clone(),
            content: version.content,
            generated_at: version.created_at,
            model_used,
            validation: ArtifactValidation {
                score,
                is_valid,
                errors: Vec::new(),
                warnings: Vec::new(),
            },
            html_content,
            folder_id: job.folder_id.as_ref().map(|f| f.as_str().to_owned()),
        })
    }
}

/// Per-job worker state, moved into its own `tokio::spawn`'d task.
struct Worker {
    backend: Arc<dyn ModelBackend>,
    context_provider: Arc<dyn ContextProvider>,
    notes_provider: Arc<dyn NotesProvider>,
    html_generator: Option<Arc<dyn HtmlGenerator>>,
    quality_judge: Option<Arc<dyn QualityJudge>>,
    event_bus: Arc<dyn EventBus>,
    versions: Arc<dyn VersionStorePort>,
    pool: Arc<dyn FinetuningPoolPort>,
    hard_negatives: Arc<dyn HardNegativeStorePort>,
    jobs: SharedJobTable,
    config: Arc<KilnConfig>,
}

impl Worker {
    async fn run(self, job_id: JobId, request: GenerationRequest, cancellation: CancellationToken) {
        self.event_bus.publish(JobEvent::Started { job_id }).await;

        if let Err(error) = self.run_inner(job_id, request, &cancellation).await {
            if cancellation.is_cancelled() {
                // Cancellation already transitioned the job; §4.1 "emits no
                // further events" on the cancelled path.
                return;
            }
            let suggestion = error.suggestion();
            let message = match suggestion {
                Some(hint) => format!("{error} ({hint})"),
                None => error.to_string(),
            };
            self.jobs.fail(job_id, message.clone(), now_secs());
            self.event_bus.publish(JobEvent::Error { job_id, error: message }).await;
        }
    }

    async fn run_inner(
        &self,
        job_id: JobId,
        request: GenerationRequest,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        // Step 2: resolve notes from the folder if not supplied inline.
        let notes = self.resolve_notes(&request).await?;

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 3: quality forecast, computed from notes alone (the context
        // bundle this forecast could otherwise draw on is not assembled
        // until step 4).
        let quality_ctx = QualityContext {
            notes_len: notes.len(),
            has_structure_cues: notes.lines().any(|l| {
                let trimmed = l.trim_start();
                trimmed.starts_with('-') || trimmed.starts_with('*') || trimmed.starts_with('#')
            }),
            rag_chunk_count: None,
            has_knowledge_graph_hit: false,
            has_pattern_signal: false,
            is_complex_artifact_type: request.artifact_type.complexity_weight() >= 0.7,
        };
        let forecast = predict_quality(&quality_ctx);
        self.jobs
            .set_quality_forecast(job_id, forecast.label.to_string(), forecast.score);
        self.event_bus
            .publish(JobEvent::Progress {
                job_id,
                progress: 15,
                message: "quality_forecast".to_owned(),
                quality_prediction: Some(QualityPredictionEvent {
                    label: forecast.label.to_string(),
                    score: forecast.score,
                }),
            })
            .await;

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 4: context assembly.
        let options: ContextOptions = serde_json::json!({
            "context_id": request.context_id,
            "folder_id": request.folder_id.as_ref().map(FolderId::as_str),
        });
        let context = self
            .context_provider
            .build_context(&notes, &options)
            .await
            .map_err(|e| Error::ContextBuildFailed {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        self.jobs.set_progress(job_id, 30, Some("context_ready".to_owned()));
        self.event_bus
            .publish(JobEvent::Progress {
                job_id,
                progress: 30,
                message: "context_ready".to_owned(),
                quality_prediction: None,
            })
            .await;

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 5: retry/fallback ladder.
        let use_validation = request.use_validation.unwrap_or(self.config.retry.use_validation);
        let max_retries = request.max_retries.unwrap_or(self.config.retry.max_retries);
        let rungs = self.config.retry.rungs_for(request.artifact_type.as_str());
        let prompt = format!("{}\n\n---\n\n{}", notes, context.assembled_context);
        let params = GenerateParams::default();

        let outcome = run_ladder(
            &self.backend,
            &self.event_bus,
            job_id,
            &rungs,
            &request.artifact_type,
            &prompt,
            &params,
            max_retries,
            use_validation,
            self.config.thresholds.acceptance,
            Some(notes.as_str()),
            cancellation,
        )
        .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(LadderFailure::Cancelled(attempts)) => {
                for attempt in attempts {
                    self.jobs.push_attempt(job_id, attempt);
                }
                return Err(Error::Cancelled);
            }
            Err(LadderFailure::Exhausted {
                attempts,
                best_errors,
                best_candidate,
            }) => {
                let best_model = attempts.last().map(|a| a.model_id.clone()).unwrap_or_default();
                let best_score = attempts.iter().filter_map(|a| a.validation_score).max().unwrap_or(0);

                // §4.7.4 supplemented feature: capture every sub-threshold
                // final candidate as a hard negative for later mining.
                if let Some((content, _model_id)) = best_candidate {
                    let case = FailureCase {
                        artifact_type: request.artifact_type.clone(),
                        input: notes.clone(),
                        output: content,
                        validation_score: best_score,
                        failure_type: best_errors.first().cloned().unwrap_or_else(|| "ladder_exhausted".to_owned()),
                        complexity_factors: vec![request.artifact_type.complexity_weight()],
                        timestamp: now_secs(),
                    };
                    let _ = self.hard_negatives.append(case).await;
                }

                for attempt in attempts {
                    self.jobs.push_attempt(job_id, attempt);
                }
                return Err(Error::ValidationBelowThreshold {
                    model_id: best_model,
                    score: best_score,
                    errors: best_errors,
                });
            }
        };
        for attempt in &outcome.attempts {
            self.jobs.push_attempt(job_id, attempt.clone());
        }

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 6c: pool admission at score >= pool_admission_target.
        if outcome.validation.score >= self.config.thresholds.pool_admission_target {
            let example = TrainingExample {
                artifact_type: request.artifact_type.clone(),
                instruction: format!("Generate a {} artifact.", request.artifact_type.as_str()),
                input: notes.clone(),
                output: outcome.content.clone(),
                quality_score: f64::from(outcome.validation.score),
                source: TrainingExampleSource::Feedback,
                feedback_type: Some(FeedbackType::Success),
                category: None,
                difficulty: None,
                is_generic_content: false,
            };
            let _ = self.pool.add(example).await;
        } else if outcome.validation.score < self.config.thresholds.failure_case_capture {
            let case = FailureCase {
                artifact_type: request.artifact_type.clone(),
                input: notes.clone(),
                output: outcome.content.clone(),
                validation_score: outcome.validation.score,
                failure_type: outcome
                    .validation
                    .errors
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "below_capture_threshold".to_owned()),
                complexity_factors: vec![request.artifact_type.complexity_weight()],
                timestamp: now_secs(),
            };
            let _ = self.hard_negatives.append(case).await;
        }

        // Step 6d: optional HTML companion for mermaid_* types.
        let html_content = if request.artifact_type.is_mermaid() {
            match &self.html_generator {
                Some(generator) => generator
                    .from_mermaid(&outcome.content, request.artifact_type.as_str(), &notes)
                    .await
                    .ok(),
                None => None,
            }
        } else {
            None
        };

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Supplemented feature: optional LLM-as-judge pass. Metadata-only —
        // a judge failure or absence never affects acceptance.
        let judge_verdict = match &self.quality_judge {
            Some(judge) => judge
                .evaluate(&outcome.content, request.artifact_type.as_str(), &notes)
                .await
                .ok(),
            None => None,
        };

        // Step 6e-f: stable id, Version write.
        let folder_str = request.folder_id.as_ref().map(FolderId::as_str);
        let artifact_id = ArtifactId::new(folder_str, &request.artifact_type);

        let mut metadata = serde_json::Map::new();
        metadata.insert("model_used".to_owned(), outcome.model_used.clone().into());
        metadata.insert("validation_score".to_owned(), outcome.validation.score.into());
        metadata.insert("is_valid".to_owned(), outcome.validation.is_valid.into());
        metadata.insert(
            "quality_prediction".to_owned(),
            serde_json::json!({"label": forecast.label.to_string(), "score": forecast.score}),
        );
        metadata.insert(
            "attempts".to_owned(),
            serde_json::to_value(&outcome.attempts).unwrap_or(serde_json::Value::Null),
        );
        metadata.insert("folder_id".to_owned(), folder_str.into());
        if let Some(html) = &html_content {
            metadata.insert("html_content".to_owned(), html.clone().into());
        }
        if let Some((score, reasoning)) = &judge_verdict {
            metadata.insert(
                "quality_judge".to_owned(),
                serde_json::json!({"score": score, "reasoning": reasoning}),
            );
        }

        let version = self
            .versions
            .create(&artifact_id, &request.artifact_type, &outcome.content, metadata, folder_str)
            .await
            .map_err(|e| Error::PersistenceError {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 6g: mark completed, emit terminal success.
        self.jobs.complete(job_id, artifact_id.clone(), now_secs());

        let artifact = Artifact {
            artifact_id,
            artifact_type: request.artifact_type,
            content: outcome.content,
            generated_at: version.created_at,
            model_used: outcome.model_used,
            validation: ArtifactValidation {
                score: outcome.validation.score,
                is_valid: outcome.validation.is_valid,
                errors: outcome.validation.errors,
                warnings: outcome.validation.warnings,
            },
            html_content,
            folder_id: folder_str.map(str::to_owned),
        };

        self.event_bus
            .publish(JobEvent::Complete {
                job_id,
                artifact_id: artifact.artifact_id.clone(),
                validation_score: artifact.validation.score,
                is_valid: artifact.validation.is_valid,
                artifact,
            })
            .await;

        Ok(())
    }

    async fn resolve_notes(&self, request: &GenerationRequest) -> Result<String> {
        if let Some(notes) = &request.notes {
            if !notes.trim().is_empty() {
                return Ok(notes.clone());
            }
        }
        let Some(folder_id) = &request.folder_id else {
            return Err(Error::invalid_request("notes empty and no folder_id to resolve from"));
        };
        let notes = self
            .notes_provider
            .get_notes_by_folder(folder_id.as_str())
            .await?
            .join("\n\n");
        if notes.trim().is_empty() {
            return Err(Error::invalid_request(format!(
                "folder {} has no notes to resolve",
                folder_id.as_str()
            )));
        }
        Ok(notes)
    }
}
