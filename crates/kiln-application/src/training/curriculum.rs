//! Curriculum Learner (§4.7.2).
//!
//! Grounded on `components/reward_calculator_enhanced.py`'s
//! `DifficultyEstimator.estimate`.

use kiln_domain::value_objects::ArtifactType;

/// Weighted difficulty estimate inputs for one training example.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyInput {
    /// Length of the input/instruction text, in characters.
    pub input_len: usize,
    /// Serialized size of the retrieved context, in characters.
    pub context_len: usize,
    /// Validator score in `[0, 100]`.
    pub validation_score: u8,
}

/// Estimate per-example difficulty in `[0, 1]` (§4.7.2).
///
/// Weighted average: artifact complexity 0.4, inverse validation score 0.3,
/// input-length bucket 0.2, context-size bucket 0.1.
#[must_use]
pub fn estimate_difficulty(artifact_type: &ArtifactType, input: &DifficultyInput) -> f64 {
    let artifact_complexity = artifact_type.complexity_weight();
    let generation_difficulty = 1.0 - f64::from(input.validation_score) / 100.0;
    let input_complexity = (input.input_len as f64 / 5000.0).min(1.0);
    let context_complexity = (input.context_len as f64 / 10_000.0).min(1.0);

    let difficulty = artifact_complexity * 0.4
        + generation_difficulty * 0.3
        + input_complexity * 0.2
        + context_complexity * 0.1;

    difficulty.clamp(0.0, 1.0)
}

/// A difficulty partition (§4.7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DifficultyBand {
    /// `difficulty <= 0.35`.
    Easy,
    /// `0.35 < difficulty <= 0.65`.
    Medium,
    /// `difficulty > 0.65`.
    Hard,
}

/// Classify a difficulty score into its band (§4.7.2).
#[must_use]
pub fn classify(difficulty: f64) -> DifficultyBand {
    if difficulty <= 0.35 {
        DifficultyBand::Easy
    } else if difficulty <= 0.65 {
        DifficultyBand::Medium
    } else {
        DifficultyBand::Hard
    }
}

/// Curriculum progression stage (§4.7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CurriculumStage {
    /// Only easy examples.
    Easy,
    /// Mostly medium, some easy.
    Medium,
    /// Mostly hard, with medium and easy mixed in.
    Hard,
    /// Full mix across all bands.
    Mixed,
}

impl CurriculumStage {
    /// Target share of each band `(easy, medium, hard)` for this stage
    /// (§4.7.2 "Batch composition by stage").
    #[must_use]
    pub fn composition(self) -> (f64, f64, f64) {
        match self {
            Self::Easy => (1.0, 0.0, 0.0),
            Self::Medium => (0.3, 0.7, 0.0),
            Self::Hard => (0.2, 0.3, 0.5),
            Self::Mixed => (0.3, 0.3, 0.4),
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard | Self::Mixed => Self::Mixed,
        }
    }
}

/// Tracks consecutive-evaluation progression for a single artifact type's
/// curriculum stage.
#[derive(Debug, Clone)]
pub struct CurriculumTracker {
    stage: CurriculumStage,
    min_evaluations: usize,
    progression_score: u8,
    recent_scores: Vec<u8>,
}

impl CurriculumTracker {
    /// Start a fresh tracker at the `Easy` stage.
    #[must_use]
    pub fn new(min_evaluations: usize, progression_score: u8) -> Self {
        Self {
            stage: CurriculumStage::Easy,
            min_evaluations,
            progression_score,
            recent_scores: Vec::new(),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> CurriculumStage {
        self.stage
    }

    /// Record one evaluation score for the current stage; advances the
    /// stage once the last `min_evaluations` each meet `progression_score`.
    pub fn record_evaluation(&mut self, score: u8) {
        self.recent_scores.push(score);
        if self.recent_scores.len() > self.min_evaluations {
            self.recent_scores.remove(0);
        }
        if self.recent_scores.len() == self.min_evaluations
            && self.recent_scores.iter().all(|&s| s >= self.progression_score)
        {
            self.stage = self.stage.next();
            self.recent_scores.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> ArtifactType {
        ArtifactType::new(s)
    }

    #[test]
    fn erd_with_good_score_is_easy() {
        let d = estimate_difficulty(
            &ty("mermaid_erd"),
            &DifficultyInput {
                input_len: 100,
                context_len: 100,
                validation_score: 95,
            },
        );
        assert_eq!(classify(d), DifficultyBand::Easy);
    }

    #[test]
    fn code_with_poor_score_is_hard() {
        let d = estimate_difficulty(
            &ty("code_prototype"),
            &DifficultyInput {
                input_len: 4000,
                context_len: 9000,
                validation_score: 20,
            },
        );
        assert_eq!(classify(d), DifficultyBand::Hard);
    }

    #[test]
    fn tracker_advances_after_enough_good_evaluations() {
        let mut tracker = CurriculumTracker::new(3, 75);
        assert_eq!(tracker.stage(), CurriculumStage::Easy);
        tracker.record_evaluation(80);
        tracker.record_evaluation(80);
        assert_eq!(tracker.stage(), CurriculumStage::Easy);
        tracker.record_evaluation(80);
        assert_eq!(tracker.stage(), CurriculumStage::Medium);
    }

    #[test]
    fn tracker_does_not_advance_on_mixed_results() {
        let mut tracker = CurriculumTracker::new(3, 75);
        tracker.record_evaluation(80);
        tracker.record_evaluation(60);
        tracker.record_evaluation(80);
        assert_eq!(tracker.stage(), CurriculumStage::Easy);
    }

    #[test]
    fn mixed_and_hard_compositions_sum_to_one() {
        for stage in [
            CurriculumStage::Easy,
            CurriculumStage::Medium,
            CurriculumStage::Hard,
            CurriculumStage::Mixed,
        ] {
            let (e, m, h) = stage.composition();
            assert!((e + m + h - 1.0).abs() < 1e-9);
        }
    }
}
