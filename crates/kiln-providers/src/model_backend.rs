//! In-memory [`ModelBackend`] reference implementation: a scriptable
//! per-model response queue for deterministic tests, falling back to a
//! built-in content generator for unscripted calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use kiln_domain::ports::{GenerateParams, GenerateResult, ModelBackend};
use kiln_domain::{Error, Result};

/// One scripted response for a model id: either a successful generation or
/// a ladder-recoverable error.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Return this content as-is.
    Content(String),
    /// Fail with [`Error::ModelUnavailable`].
    Unavailable,
    /// Fail with [`Error::ModelError`].
    Error(String),
}

/// Deterministic, in-memory model backend. Queue canned
/// [`ScriptedResponse`]s per model id with [`Self::script`]; once a model's
/// queue is drained, calls fall back to [`default_content`] so unscripted
/// tests still get something plausible.
#[derive(Default)]
pub struct InMemoryModelBackend {
    scripts: DashMap<String, Arc<Mutex<VecDeque<ScriptedResponse>>>>,
    known_models: DashMap<String, ()>,
}

impl InMemoryModelBackend {
    /// Create a backend with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `responses`, consumed in order on successive `generate` calls
    /// for `model_id`.
    pub fn script(&self, model_id: impl Into<String>, responses: impl IntoIterator<Item = ScriptedResponse>) {
        let model_id = model_id.into();
        self.known_models.insert(model_id.clone(), ());
        self.scripts
            .entry(model_id)
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .value()
            .lock()
            .expect("model backend script lock poisoned")
            .extend(responses);
    }
}

/// Built-in unscripted fallback: a minimally-valid body for known mermaid
/// dialects, else a generic echo of the prompt's first line.
fn default_content(model_id: &str, prompt: &str) -> String {
    if prompt.contains("erDiagram") || prompt.to_ascii_lowercase().contains("erd") {
        return "erDiagram\n    NOTES ||--o{ ARTIFACT : generates".to_owned();
    }
    let first_line = prompt.lines().next().unwrap_or(prompt);
    format!("Generated by {model_id}: {first_line}")
}

#[async_trait]
impl ModelBackend for InMemoryModelBackend {
    async fn generate(&self, model_id: &str, prompt: &str, params: &GenerateParams) -> Result<GenerateResult> {
        let _ = params;
        if let Some(queue) = self.scripts.get(model_id) {
            let next = queue.value().lock().expect("model backend script lock poisoned").pop_front();
            if let Some(response) = next {
                return match response {
                    ScriptedResponse::Content(content) => Ok(GenerateResult {
                        content,
                        model_used: model_id.to_owned(),
                        tokens: None,
                        latency_ms: 5,
                    }),
                    ScriptedResponse::Unavailable => Err(Error::ModelUnavailable {
                        model_id: model_id.to_owned(),
                        message: "scripted unavailability".into(),
                    }),
                    ScriptedResponse::Error(message) => Err(Error::ModelError {
                        model_id: model_id.to_owned(),
                        message,
                    }),
                };
            }
        }

        Ok(GenerateResult {
            content: default_content(model_id, prompt),
            model_used: model_id.to_owned(),
            tokens: None,
            latency_ms: 5,
        })
    }

    async fn ensure_model_available(&self, model_id: &str) -> Result<()> {
        let _ = model_id;
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.known_models.iter().map(|e| e.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_call_returns_default_content() {
        let backend = InMemoryModelBackend::new();
        let result = backend
            .generate("local-default", "draw an erDiagram for Users and Orders", &GenerateParams::default())
            .await
            .unwrap();
        assert!(result.content.starts_with("erDiagram"));
    }

    #[tokio::test]
    async fn scripted_responses_are_consumed_in_order() {
        let backend = InMemoryModelBackend::new();
        backend.script(
            "local-default",
            [
                ScriptedResponse::Content("not a diagram".into()),
                ScriptedResponse::Content("erDiagram\n    A ||--o{ B : has".into()),
            ],
        );

        let first = backend.generate("local-default", "p", &GenerateParams::default()).await.unwrap();
        assert_eq!(first.content, "not a diagram");
        let second = backend.generate("local-default", "p", &GenerateParams::default()).await.unwrap();
        assert!(second.content.starts_with("erDiagram"));
        let third = backend.generate("local-default", "p", &GenerateParams::default()).await.unwrap();
        assert!(third.content.starts_with("erDiagram"));
    }

    #[tokio::test]
    async fn scripted_unavailability_surfaces_as_model_unavailable() {
        let backend = InMemoryModelBackend::new();
        backend.script("flaky", [ScriptedResponse::Unavailable]);
        let err = backend.generate("flaky", "p", &GenerateParams::default()).await.unwrap_err();
        assert!(err.is_ladder_recoverable());
    }
}
