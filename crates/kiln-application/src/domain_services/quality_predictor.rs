//! Pre-generation quality forecasting (§4.9).
//!
//! A pure heuristic over the inputs available *before* a model call is
//! made, so the orchestrator can surface a forecast alongside `Progress`
//! events. Grounded on `backend/services/quality_predictor.py`.

use serde::{Deserialize, Serialize};

/// Context-richness signals fed to [`predict_quality`].
#[derive(Debug, Clone, Default)]
pub struct QualityContext {
    /// Length in characters of the assembled meeting notes.
    pub notes_len: usize,
    /// Whether the notes contain list/step structure (`"- "`, `"* "`,
    /// `"1."`, `"2."`).
    pub has_structure_cues: bool,
    /// Number of RAG context chunks retrieved, if context assembly ran.
    pub rag_chunk_count: Option<usize>,
    /// Whether a knowledge-graph entity was matched for this request.
    pub has_knowledge_graph_hit: bool,
    /// Whether pattern-mining surfaced a prior similar successful artifact.
    pub has_pattern_signal: bool,
    /// `true` for artifact types the model historically struggles with
    /// (code prototypes, API docs, HTML prototypes).
    pub is_complex_artifact_type: bool,
}

/// Coarse quality band derived from the numeric forecast (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    /// Forecast `< 0.5`.
    Low,
    /// Forecast in `[0.5, 0.75)`.
    Medium,
    /// Forecast `>= 0.75`.
    High,
}

impl QualityLabel {
    fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// A forecast of generation quality, computed before any model call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityPrediction {
    /// The numeric forecast, clamped to `[0, 1]`.
    pub score: f64,
    /// The coarse band `score` falls into.
    pub label: QualityLabel,
}

/// Forecast generation quality from pre-generation context signals (§4.9).
#[must_use]
pub fn predict_quality(ctx: &QualityContext) -> QualityPrediction {
    let mut score = 0.55_f64;

    if ctx.notes_len > 1200 {
        score += 0.2;
    } else if ctx.notes_len > 600 {
        score += 0.1;
    } else if ctx.notes_len < 200 {
        score -= 0.15;
    }

    if ctx.has_structure_cues {
        score += 0.05;
    }

    match ctx.rag_chunk_count {
        Some(n) if n >= 15 => score += 0.1,
        Some(0) => score -= 0.1,
        _ => {}
    }

    if ctx.has_knowledge_graph_hit {
        score += 0.05;
    }

    if ctx.has_pattern_signal {
        score += 0.03;
    }

    if ctx.is_complex_artifact_type {
        score -= 0.1;
    }

    let score = score.clamp(0.0, 1.0);
    QualityPrediction {
        score,
        label: QualityLabel::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_with_no_signals_is_medium() {
        let prediction = predict_quality(&QualityContext::default());
        assert_eq!(prediction.label, QualityLabel::Medium);
        assert!((prediction.score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn rich_context_pushes_into_high_band() {
        let ctx = QualityContext {
            notes_len: 1500,
            has_structure_cues: true,
            rag_chunk_count: Some(20),
            has_knowledge_graph_hit: true,
            has_pattern_signal: true,
            is_complex_artifact_type: false,
        };
        let prediction = predict_quality(&ctx);
        assert_eq!(prediction.label, QualityLabel::High);
    }

    #[test]
    fn sparse_notes_and_no_rag_pushes_into_low_band() {
        let ctx = QualityContext {
            notes_len: 80,
            has_structure_cues: false,
            rag_chunk_count: Some(0),
            has_knowledge_graph_hit: false,
            has_pattern_signal: false,
            is_complex_artifact_type: true,
        };
        let prediction = predict_quality(&ctx);
        assert_eq!(prediction.label, QualityLabel::Low);
    }

    #[test]
    fn score_never_leaves_unit_interval() {
        let ctx = QualityContext {
            notes_len: 2000,
            has_structure_cues: true,
            rag_chunk_count: Some(50),
            has_knowledge_graph_hit: true,
            has_pattern_signal: true,
            is_complex_artifact_type: false,
        };
        assert!(predict_quality(&ctx).score <= 1.0);

        let ctx = QualityContext {
            notes_len: 0,
            is_complex_artifact_type: true,
            rag_chunk_count: Some(0),
            ..Default::default()
        };
        assert!(predict_quality(&ctx).score >= 0.0);
    }
}
