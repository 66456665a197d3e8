//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the artifact generation orchestrator.
///
/// Variants map onto the error kinds the orchestrator must distinguish when
/// deciding whether to recover locally (advance the retry ladder) or surface
/// a job to its terminal `failed` state.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller's request was malformed or under-specified.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Human-readable explanation.
        message: String,
    },

    /// The context provider failed to assemble context.
    #[error("context build failed: {message}")]
    ContextBuildFailed {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A model backend could not be reached or the requested model is not loaded.
    #[error("model unavailable: {model_id}: {message}")]
    ModelUnavailable {
        /// The model that was unreachable.
        model_id: String,
        /// Description of the failure.
        message: String,
    },

    /// A model backend call exceeded its per-attempt deadline.
    #[error("model timeout: {model_id} after {elapsed_ms}ms")]
    ModelTimeout {
        /// The model that timed out.
        model_id: String,
        /// Elapsed time before the timeout fired.
        elapsed_ms: u64,
    },

    /// A model backend returned an error response.
    #[error("model error: {model_id}: {message}")]
    ModelError {
        /// The model that errored.
        model_id: String,
        /// Description of the error.
        message: String,
    },

    /// A candidate was produced but scored below the orchestrator's
    /// acceptance threshold and no retry budget remains.
    #[error("validation below threshold: score {score} (best model {model_id}): {errors:?}")]
    ValidationBelowThreshold {
        /// The best-scoring candidate's model id.
        model_id: String,
        /// The best-scoring candidate's validation score.
        score: u8,
        /// The best candidate's validator errors.
        errors: Vec<String>,
    },

    /// The Version Store failed to persist a new version.
    #[error("persistence error: {message}")]
    PersistenceError {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The job was cancelled by its caller.
    #[error("cancelled")]
    Cancelled,

    /// A resource could not be located.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O failure underlying a persistence or config operation.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },

    /// Catchall for unanticipated faults. Logged with context by the caller;
    /// the `message` surfaced to users is expected to already be sanitized.
    #[error("internal error: {message}")]
    Internal {
        /// Sanitized description safe to surface to a caller.
        message: String,
    },
}

impl Error {
    /// Construct an [`Error::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Construct an [`Error::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Construct an [`Error::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Construct an [`Error::Configuration`] with no underlying source.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// `true` if the error should be recovered locally by the retry/fallback
    /// ladder (advance a rung or repair) rather than surfaced to the job's
    /// terminal state.
    #[must_use]
    pub fn is_ladder_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. } | Self::ModelTimeout { .. } | Self::ModelError { .. }
        )
    }

    /// A short, user-facing suggestion for recognizable error classes, per
    /// the orchestrator's user-visible failure message contract.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ModelUnavailable { .. } => {
                Some("no local model available — enable a cloud backend")
            }
            Self::ModelTimeout { .. } => Some("the model took too long to respond — try again or raise the timeout"),
            Self::ValidationBelowThreshold { .. } => {
                Some("generated content did not meet the quality bar after all retries")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_recoverable_kinds() {
        assert!(
            Error::ModelUnavailable {
                model_id: "m".into(),
                message: "down".into()
            }
            .is_ladder_recoverable()
        );
        assert!(!Error::Cancelled.is_ladder_recoverable());
        assert!(!Error::invalid_request("x").is_ladder_recoverable());
    }

    #[test]
    fn suggestions_present_for_recognizable_classes() {
        let err = Error::ModelUnavailable {
            model_id: "m".into(),
            message: "down".into(),
        };
        assert!(err.suggestion().is_some());
        assert!(Error::Cancelled.suggestion().is_none());
    }
}
