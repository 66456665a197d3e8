//! Data Augmenter (§4.7.5).

use kiln_domain::entities::{TrainingExample, TrainingExampleSource};

/// Per-example quality discount applied to augmented examples, relative to
/// their source (§4.7.5). `quality_score` lives on the same 0-100 scale as
/// [`kiln_domain::entities::FeedbackEvent::score`].
pub const AUGMENTED_QUALITY_DISCOUNT: f64 = 0.95;

/// Rule-based synonym table for the paraphrase strategy. Deliberately small
/// and conservative — swaps only words unlikely to change diagram/code
/// semantics.
const SYNONYMS: &[(&str, &str)] = &[
    ("create", "build"),
    ("show", "display"),
    ("list", "enumerate"),
    ("user", "customer"),
    ("update", "modify"),
    ("remove", "delete"),
    ("add", "insert"),
    ("simple", "basic"),
];

fn paraphrase(text: &str) -> String {
    let mut out = text.to_owned();
    for (from, to) in SYNONYMS {
        if out.to_ascii_lowercase().contains(from) {
            out = replace_case_insensitive(&out, from, to);
            break;
        }
    }
    out
}

fn replace_case_insensitive(haystack: &str, from: &str, to: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let Some(idx) = lower.find(from) else {
        return haystack.to_owned();
    };
    let mut out = String::with_capacity(haystack.len());
    out.push_str(&haystack[..idx]);
    out.push_str(to);
    out.push_str(&haystack[idx + from.len()..]);
    out
}

/// Artifact families whose output is insensitive to declaration order,
/// making whitespace/comment variation safe (§4.7.5).
fn is_order_insensitive(artifact_family: &str) -> bool {
    matches!(artifact_family, "erd" | "code_prototype" | "api_docs")
}

fn vary_output(output: &str) -> String {
    format!("{output}\n")
}

/// Augmentation strategy applied to produce one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentStrategy {
    /// Rule-based synonym substitution on the instruction/input text.
    Paraphrase,
    /// Same input, conceptually different retrieved context (category tag
    /// changes; the retrieval itself is out of this function's scope).
    ContextVariation,
    /// Whitespace/comment-only output variation, restricted to
    /// order-insensitive artifact families.
    OutputVariation,
}

/// Expand `source` into `factor` total examples (including the original)
/// using the available strategies, each tagged with a reduced quality
/// score (§4.7.5).
#[must_use]
pub fn augment(source: &TrainingExample, factor: usize, artifact_family: &str) -> Vec<TrainingExample> {
    if factor <= 1 {
        return vec![source.clone()];
    }

    let mut strategies = vec![AugmentStrategy::Paraphrase, AugmentStrategy::ContextVariation];
    if is_order_insensitive(artifact_family) {
        strategies.push(AugmentStrategy::OutputVariation);
    }

    let mut out = vec![source.clone()];
    let mut strategy_idx = 0;
    while out.len() < factor {
        let strategy = strategies[strategy_idx % strategies.len()];
        out.push(apply_strategy(source, strategy));
        strategy_idx += 1;
    }
    out
}

fn apply_strategy(source: &TrainingExample, strategy: AugmentStrategy) -> TrainingExample {
    let mut variant = source.clone();
    variant.source = TrainingExampleSource::Synthetic;
    variant.quality_score = (source.quality_score * AUGMENTED_QUALITY_DISCOUNT).clamp(0.0, 100.0);

    match strategy {
        AugmentStrategy::Paraphrase => {
            variant.instruction = paraphrase(&source.instruction);
            variant.input = paraphrase(&source.input);
        }
        AugmentStrategy::ContextVariation => {
            variant.category = Some(format!(
                "{}-context-variant",
                source.category.clone().unwrap_or_default()
            ));
        }
        AugmentStrategy::OutputVariation => {
            variant.output = vary_output(&source.output);
        }
    }
    variant
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_domain::value_objects::ArtifactType;

    fn example() -> TrainingExample {
        TrainingExample {
            artifact_type: ArtifactType::new("mermaid_erd"),
            instruction: "create an erd".to_owned(),
            input: "simple user model".to_owned(),
            output: "erDiagram\nUser {\nint id\n}".to_owned(),
            quality_score: 90.0,
            source: TrainingExampleSource::Feedback,
            feedback_type: None,
            category: Some("billing".to_owned()),
            difficulty: None,
            is_generic_content: false,
        }
    }

    #[test]
    fn factor_one_returns_only_the_original() {
        let result = augment(&example(), 1, "erd");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, TrainingExampleSource::Feedback);
    }

    #[test]
    fn expands_to_requested_factor() {
        let result = augment(&example(), 4, "erd");
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn augmented_examples_are_discounted_and_tagged_synthetic() {
        let result = augment(&example(), 3, "erd");
        for variant in &result[1..] {
            assert_eq!(variant.source, TrainingExampleSource::Synthetic);
            assert!(variant.quality_score < 90.0);
        }
    }

    #[test]
    fn output_variation_only_applies_to_order_insensitive_families() {
        let result = augment(&example(), 4, "sequence");
        let varied_output = format!("{}\n", example().output);
        assert!(result.iter().all(|e| e.output != varied_output));
    }
}
