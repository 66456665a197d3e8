//! In-memory [`QualityJudge`]: a deterministic heuristic judge, scoring
//! content by length and structural markers rather than a real model call.
//! Its verdict is attached to Version metadata only — it never gates
//! generation.

use kiln_domain::ports::QualityJudge;
use kiln_domain::Result;

/// Heuristic stand-in for an LLM-as-judge collaborator.
#[derive(Default)]
pub struct HeuristicQualityJudge;

impl HeuristicQualityJudge {
    /// Create a new judge. Stateless.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl QualityJudge for HeuristicQualityJudge {
    async fn evaluate(&self, content: &str, artifact_type: &str, notes: &str) -> Result<(u8, String)> {
        let mut score: i32 = 50;
        let mut reasons = Vec::new();

        if content.len() > 40 {
            score += 20;
            reasons.push("substantial content length".to_owned());
        }
        if artifact_type.contains("mermaid") && content.contains("--") {
            score += 20;
            reasons.push("contains relationship syntax".to_owned());
        }
        if !notes.is_empty() && notes.split_whitespace().any(|word| content.contains(word)) {
            score += 10;
            reasons.push("references terms from the source notes".to_owned());
        }

        let score = score.clamp(0, 100) as u8;
        let reasoning = if reasons.is_empty() {
            "no distinguishing structure found".to_owned()
        } else {
            reasons.join("; ")
        };

        Ok((score, reasoning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rewards_structure_and_notes_overlap() {
        let judge = HeuristicQualityJudge::new();
        let (score, reasoning) = judge
            .evaluate(
                "erDiagram\n    CUSTOMER ||--o{ ORDER : places",
                "mermaid_erd",
                "CUSTOMER places ORDER records",
            )
            .await
            .unwrap();

        assert!(score > 50);
        assert!(!reasoning.is_empty());
    }

    #[tokio::test]
    async fn sparse_content_scores_lower() {
        let judge = HeuristicQualityJudge::new();
        let (score, _) = judge.evaluate("x", "mermaid_erd", "").await.unwrap();
        assert!(score <= 50);
    }
}
