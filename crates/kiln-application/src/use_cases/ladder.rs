//! Retry / Fallback Ladder (§4.1.1).

use std::sync::Arc;

use futures::StreamExt;
use kiln_domain::entities::Attempt;
use kiln_domain::events::JobEvent;
use kiln_domain::ports::{EventBus, GenerateParams, ModelBackend};
use kiln_domain::value_objects::{ArtifactType, JobId};
use kiln_domain::{Error, Result};
use tokio_util::sync::CancellationToken;

use crate::config::LadderRung;
use crate::domain_services::{clean, validate, ValidationResult};

/// A successful ladder run: cleaned, validated content plus the full
/// attempt trail.
#[derive(Debug, Clone)]
pub struct LadderOutcome {
    /// The accepted (cleaned) content.
    pub content: String,
    /// The model id that produced the accepted content.
    pub model_used: String,
    /// The validator's verdict on the accepted content.
    pub validation: ValidationResult,
    /// Every attempt made, in order (§4.1.1 "included in the final Version
    /// metadata").
    pub attempts: Vec<Attempt>,
}

/// Why the ladder did not produce an accepted candidate.
#[derive(Debug)]
pub enum LadderFailure {
    /// All rungs (and the retry budget) were exhausted.
    Exhausted {
        /// Every attempt made before giving up.
        attempts: Vec<Attempt>,
        /// The best (highest-score) attempt's errors, for the failure
        /// message.
        best_errors: Vec<String>,
        /// The best-scoring candidate's cleaned content and model id, for
        /// hard-negative capture.
        best_candidate: Option<(String, String)>,
    },
    /// The job's cancellation token fired at a suspension point.
    Cancelled(Vec<Attempt>),
}

fn repair_prompt(base_prompt: &str, errors: &[String]) -> String {
    let mut prompt = String::from(base_prompt);
    prompt.push_str("\n\nCRITICAL FIX REQUIRED — address every issue below:\n");
    for error in errors {
        prompt.push_str("- ");
        prompt.push_str(error);
        prompt.push('\n');
    }
    prompt
}

/// Run the ordered rung policy until a candidate passes validation, all
/// rungs are exhausted, or `max_retries` total attempts are spent
/// (§4.1.1).
#[allow(clippy::too_many_arguments)]
pub async fn run_ladder(
    backend: &Arc<dyn ModelBackend>,
    event_bus: &Arc<dyn EventBus>,
    job_id: JobId,
    rungs: &[LadderRung],
    artifact_type: &ArtifactType,
    base_prompt: &str,
    params_template: &GenerateParams,
    max_retries: u32,
    use_validation: bool,
    acceptance_threshold: u8,
    context_notes: Option<&str>,
    cancellation: &CancellationToken,
) -> std::result::Result<LadderOutcome, LadderFailure> {
    let mut attempts: Vec<Attempt> = Vec::new();
    let mut best: Option<(String, String, ValidationResult)> = None;

    'rungs: for rung in rungs {
        if attempts.len() as u32 >= max_retries {
            break;
        }

        let mut prompt = base_prompt.to_owned();
        let mut is_repair = false;

        loop {
            if cancellation.is_cancelled() {
                return Err(LadderFailure::Cancelled(attempts));
            }
            if attempts.len() as u32 >= max_retries {
                break 'rungs;
            }

            let attempt_result = generate_one(
                backend,
                event_bus,
                job_id,
                &rung.model_id,
                &prompt,
                params_template,
                cancellation,
            )
            .await;

            let Ok(raw) = attempt_result else {
                attempts.push(Attempt {
                    model_id: rung.model_id.clone(),
                    validation_score: None,
                    errors: vec![attempt_result.unwrap_err().to_string()],
                    is_repair,
                });
                break;
            };

            let cleaned = clean(&raw.content, artifact_type);
            let validation = if use_validation {
                validate(artifact_type, &cleaned, context_notes)
            } else {
                ValidationResult {
                    is_valid: true,
                    score: 100,
                    errors: Vec::new(),
                    warnings: Vec::new(),
                    suggestions: Vec::new(),
                }
            };

            attempts.push(Attempt {
                model_id: rung.model_id.clone(),
                validation_score: Some(validation.score),
                errors: validation.errors.clone(),
                is_repair,
            });

            let _ = event_bus
                .publish(JobEvent::Progress {
                    job_id,
                    progress: 50,
                    message: format!("attempt on {} scored {}", rung.model_id, validation.score),
                    quality_prediction: None,
                })
                .await;

            if !use_validation || validation.score >= acceptance_threshold {
                return Ok(LadderOutcome {
                    content: cleaned,
                    model_used: rung.model_id.clone(),
                    validation,
                    attempts,
                });
            }

            let is_better = best
                .as_ref()
                .is_none_or(|(_, _, b)| validation.score > b.score);
            if is_better {
                best = Some((cleaned.clone(), rung.model_id.clone(), validation.clone()));
            }

            if rung.allow_repair && !is_repair && attempts.len() as u32 < max_retries {
                prompt = repair_prompt(base_prompt, &validation.errors);
                is_repair = true;
                continue;
            }
            break;
        }
    }

    let best_errors = best.as_ref().map(|(_, _, v)| v.errors.clone()).unwrap_or_default();
    let best_candidate = best.map(|(content, model_id, _)| (content, model_id));
    Err(LadderFailure::Exhausted {
        attempts,
        best_errors,
        best_candidate,
    })
}

async fn generate_one(
    backend: &Arc<dyn ModelBackend>,
    event_bus: &Arc<dyn EventBus>,
    job_id: JobId,
    model_id: &str,
    prompt: &str,
    params: &GenerateParams,
    cancellation: &CancellationToken,
) -> Result<kiln_domain::ports::GenerateResult> {
    tokio::select! {
        biased;
        () = cancellation.cancelled() => Err(Error::Cancelled),
        result = backend.generate(model_id, prompt, params) => {
            if let Some(mut stream) = backend.stream(model_id, prompt, params).await.ok().flatten() {
                while let Some(token) = stream.next().await {
                    if cancellation.is_cancelled() {
                        break;
                    }
                    let Ok(token) = token else {
                        break;
                    };
                    let _ = event_bus
                        .publish(JobEvent::Chunk { job_id, chunk: token.text })
                        .await;
                }
            }
            result
        }
    }
}
