//! Model backend, context provider, notes provider, and the optional
//! HTML-generator / quality-judge collaborators (§6).

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sampling/generation parameters passed to a [`ModelBackend`] (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateParams {
    /// Optional system prompt.
    pub system: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-attempt deadline; a backend that exceeds this should return
    /// [`crate::error::Error::ModelTimeout`].
    pub timeout_ms: u64,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            system: None,
            temperature: 0.2,
            timeout_ms: 30_000,
        }
    }
}

/// The result of a successful (non-streamed) generation call (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    /// Raw model output.
    pub content: String,
    /// The model id that actually served the request (may differ from the
    /// one requested, e.g. after internal backend routing).
    pub model_used: String,
    /// Tokens consumed, if the backend reports it.
    pub tokens: Option<u32>,
    /// Observed latency in milliseconds.
    pub latency_ms: u64,
}

/// One streamed token, for backends that support [`ModelBackend::stream`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamToken {
    /// The text fragment.
    pub text: String,
}

/// Contract for a local or remote model tier (§2 leaf 1, §6).
///
/// Tier selection (which model id to call, in what order) is the
/// orchestrator's concern, not this trait's — an implementation just answers
/// "can you serve this model id, and what does it say".
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generate content for `model_id` given `prompt`.
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<GenerateResult>;

    /// Stream tokens for `model_id` given `prompt`, if this backend supports
    /// streaming. The default implementation returns `None` (no streaming
    /// support), matching §6's "optional" `Stream` contract.
    async fn stream(
        &self,
        _model_id: &str,
        _prompt: &str,
        _params: &GenerateParams,
    ) -> Result<Option<BoxStream<'static, Result<StreamToken>>>> {
        Ok(None)
    }

    /// Confirm a model is loaded/reachable before attempting generation.
    async fn ensure_model_available(&self, model_id: &str) -> Result<()>;

    /// List model ids this backend currently serves.
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Context assembled for a generation request, plus provenance (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    /// The assembled context string handed to the model.
    pub assembled_context: String,
    /// Opaque source descriptors (RAG chunk ids, KG node ids, …), retained
    /// only for provenance/metadata, never interpreted by the core.
    pub sources: serde_json::Value,
    /// `true` if this bundle was served from a `context_id` cache rather
    /// than freshly assembled.
    pub from_cache: bool,
}

/// Options influencing context assembly, forwarded opaquely (§6).
pub type ContextOptions = serde_json::Value;

/// Contract for the pluggable context-assembly collaborator (§2 leaf 2, §6).
/// Repository scanning, knowledge-graph construction, and pattern mining are
/// out of scope for the core (§1) — they live behind this trait.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Build (or fetch from cache) the context for a generation request.
    async fn build_context(&self, notes: &str, options: &ContextOptions) -> Result<ContextBundle>;
}

/// Contract for resolving meeting notes by folder, and suggesting a folder
/// for unscoped content (§6 "Notes provider").
#[async_trait]
pub trait NotesProvider: Send + Sync {
    /// Fetch all notes recorded under a folder, concatenated/ordered by the
    /// provider's own convention.
    async fn get_notes_by_folder(&self, folder_id: &str) -> Result<Vec<String>>;

    /// Suggest a folder for unscoped content.
    async fn suggest_folder(&self, content: &str) -> Result<FolderSuggestion>;
}

/// Result of [`NotesProvider::suggest_folder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSuggestion {
    /// The suggested folder id.
    pub suggested_folder: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Alternative folder ids, most to least likely.
    pub alternatives: Vec<String>,
}

/// Contract for rendering a `mermaid_*` artifact's HTML companion (§4.1 step
/// 6d, §6). Failures here are warnings, never job failures.
#[async_trait]
pub trait HtmlGenerator: Send + Sync {
    /// Render `content` (mermaid source) of `artifact_type` to HTML.
    async fn from_mermaid(
        &self,
        content: &str,
        artifact_type: &str,
        notes: &str,
    ) -> Result<String>;
}

/// Contract for the optional LLM-as-judge collaborator (SPEC_FULL §2
/// supplemented feature, §6). Output is attached as Version metadata only —
/// it never gates generation.
#[async_trait]
pub trait QualityJudge: Send + Sync {
    /// Evaluate `content` and return `(score in [0,100], reasoning)`.
    async fn evaluate(&self, content: &str, artifact_type: &str, notes: &str)
    -> Result<(u8, String)>;
}
