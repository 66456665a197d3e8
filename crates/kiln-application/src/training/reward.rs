//! Reward Calculator (§4.7.7).
//!
//! Grounded on `components/reward_calculator_enhanced.py`'s
//! `calculate_reward`: validation score mapped through `tanh`, a feedback
//! bonus, temporal decay, a difficulty multiplier, and a distribution
//! balance multiplier, clamped to `[-1, 1]`.

use kiln_domain::entities::FeedbackType;

use super::similarity::combined_similarity;

/// Default per-day temporal decay rate.
pub const DEFAULT_DECAY_RATE: f64 = 0.95;
/// Default difficulty-boost weight.
pub const DEFAULT_DIFFICULTY_WEIGHT: f64 = 1.5;
/// Default per-type count above which distribution balancing applies.
pub const DEFAULT_BALANCE_THRESHOLD: usize = 100;

const DECAY_FLOOR: f64 = 0.1;
const BALANCE_FLOOR: f64 = 0.5;

/// Everything [`calculate_reward`] needs to score one training event.
#[derive(Debug, Clone)]
pub struct RewardInput<'a> {
    /// Validator score in `[0, 100]`.
    pub validation_score: u8,
    /// User feedback on this artifact, if any arrived.
    pub feedback_type: Option<FeedbackType>,
    /// Original model output, for correction-similarity scoring.
    pub original_content: Option<&'a str>,
    /// User-corrected content, for correction-similarity scoring.
    pub corrected_content: Option<&'a str>,
    /// Age of the event in days, for temporal decay.
    pub age_days: f64,
    /// Estimated difficulty in `[0, 1]` (§4.7.2).
    pub difficulty: f64,
    /// Current example count for this artifact type, for distribution
    /// balancing.
    pub per_type_count: usize,
}

/// Tunable knobs for [`calculate_reward`], mirroring [`crate::config::RewardConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RewardTuning {
    /// Per-day decay rate.
    pub decay_rate: f64,
    /// Difficulty-boost weight.
    pub difficulty_weight: f64,
    /// Per-type count above which balancing kicks in.
    pub balance_threshold: usize,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            decay_rate: DEFAULT_DECAY_RATE,
            difficulty_weight: DEFAULT_DIFFICULTY_WEIGHT,
            balance_threshold: DEFAULT_BALANCE_THRESHOLD,
        }
    }
}

fn feedback_bonus(input: &RewardInput<'_>) -> f64 {
    match input.feedback_type {
        Some(FeedbackType::Success) => 0.3,
        Some(FeedbackType::Positive) => 0.5,
        Some(FeedbackType::Negative) => -1.0,
        Some(FeedbackType::ValidationFailure) => -0.5,
        Some(FeedbackType::Correction) => {
            let similarity = match (input.original_content, input.corrected_content) {
                (Some(orig), Some(corrected)) => combined_similarity(orig, corrected),
                _ => 0.0,
            };
            similarity.clamp(0.0, 1.0) * 0.2
        }
        None => 0.0,
    }
}

/// Reward in `[-1, 1]` for a single training event (§4.7.7).
#[must_use]
pub fn calculate_reward(input: &RewardInput<'_>, tuning: &RewardTuning) -> f64 {
    let base = (f64::from(input.validation_score) - 50.0) / 50.0;
    let base = base.tanh();

    let with_feedback = base + feedback_bonus(input);

    let decay = tuning.decay_rate.powf(input.age_days.max(0.0)).max(DECAY_FLOOR);
    let decayed = with_feedback * decay;

    let difficulty_multiplier = 1.0 + input.difficulty.clamp(0.0, 1.0) * (tuning.difficulty_weight - 1.0);
    let with_difficulty = decayed * difficulty_multiplier;

    let balance_multiplier = if input.per_type_count > tuning.balance_threshold {
        let excess = (input.per_type_count - tuning.balance_threshold) as f64;
        (-excess / 50.0).exp().max(BALANCE_FLOOR)
    } else {
        1.0
    };

    (with_difficulty * balance_multiplier).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> RewardInput<'static> {
        RewardInput {
            validation_score: 50,
            feedback_type: None,
            original_content: None,
            corrected_content: None,
            age_days: 0.0,
            difficulty: 0.0,
            per_type_count: 0,
        }
    }

    #[test]
    fn midpoint_score_with_no_feedback_is_near_zero() {
        let reward = calculate_reward(&base_input(), &RewardTuning::default());
        assert!(reward.abs() < 1e-6);
    }

    #[test]
    fn explicit_positive_feedback_increases_reward() {
        let mut input = base_input();
        input.feedback_type = Some(FeedbackType::Positive);
        let reward = calculate_reward(&input, &RewardTuning::default());
        assert!(reward > 0.0);
    }

    #[test]
    fn explicit_negative_feedback_decreases_reward() {
        let mut input = base_input();
        input.validation_score = 90;
        input.feedback_type = Some(FeedbackType::Negative);
        let reward = calculate_reward(&input, &RewardTuning::default());
        assert!(reward < 0.0);
    }

    #[test]
    fn old_events_decay_toward_zero_but_never_past_floor() {
        let mut input = base_input();
        input.validation_score = 100;
        input.age_days = 1000.0;
        let reward = calculate_reward(&input, &RewardTuning::default());
        let undecayed = calculate_reward(
            &RewardInput {
                age_days: 0.0,
                ..input.clone()
            },
            &RewardTuning::default(),
        );
        assert!(reward.abs() <= undecayed.abs());
        assert!(reward.abs() >= undecayed.abs() * DECAY_FLOOR - 1e-6);
    }

    #[test]
    fn reward_is_always_clamped() {
        let mut input = base_input();
        input.validation_score = 100;
        input.feedback_type = Some(FeedbackType::Positive);
        input.difficulty = 1.0;
        let reward = calculate_reward(&input, &RewardTuning::default());
        assert!(reward <= 1.0);

        input.validation_score = 0;
        input.feedback_type = Some(FeedbackType::Negative);
        let reward = calculate_reward(&input, &RewardTuning::default());
        assert!(reward >= -1.0);
    }

    #[test]
    fn distribution_balancing_shrinks_excess_type_reward() {
        let mut input = base_input();
        input.validation_score = 100;
        input.per_type_count = 300;
        let balanced = calculate_reward(&input, &RewardTuning::default());
        input.per_type_count = 10;
        let unbalanced = calculate_reward(&input, &RewardTuning::default());
        assert!(balanced < unbalanced);
    }
}
