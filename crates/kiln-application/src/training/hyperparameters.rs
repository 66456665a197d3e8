//! Hyperparameter Optimizer (§4.7.6).
//!
//! A thin search-space description plus a best-seen-config lookup; the
//! actual Bayesian search loop is external (the trainer consumes emitted
//! [`kiln_domain::entities::TrainingBatch`] records and reports results back
//! through [`HyperparameterTrial`]).

use serde::{Deserialize, Serialize};

/// A finetuning hyperparameter configuration (§4.7.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate, searched log-uniformly over `[1e-6, 1e-3]`.
    pub learning_rate: f64,
    /// Batch size, searched log-uniformly over `[8, 64]`.
    pub batch_size: u32,
    /// Epoch count, searched uniformly over `[1, 10]`.
    pub num_epochs: u32,
    /// Warmup ratio, searched uniformly over `[0, 0.2]`.
    pub warmup_ratio: f64,
    /// LoRA rank, searched log-uniformly over `[4, 64]`.
    pub lora_r: u32,
    /// LoRA alpha, searched log-uniformly over `[8, 128]`.
    pub lora_alpha: u32,
    /// LoRA dropout, searched uniformly over `[0, 0.1]`.
    pub lora_dropout: f64,
}

impl Default for Hyperparameters {
    /// A documented, reasonable default used before any trial has
    /// completed for a given artifact type (§4.7.6 "`LoadBest` ... or a
    /// documented default").
    fn default() -> Self {
        Self {
            learning_rate: 2e-4,
            batch_size: 16,
            num_epochs: 3,
            warmup_ratio: 0.03,
            lora_r: 16,
            lora_alpha: 32,
            lora_dropout: 0.05,
        }
    }
}

impl Hyperparameters {
    /// Bounds each field to its documented search space.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.learning_rate = self.learning_rate.clamp(1e-6, 1e-3);
        self.batch_size = self.batch_size.clamp(8, 64);
        self.num_epochs = self.num_epochs.clamp(1, 10);
        self.warmup_ratio = self.warmup_ratio.clamp(0.0, 0.2);
        self.lora_r = self.lora_r.clamp(4, 64);
        self.lora_alpha = self.lora_alpha.clamp(8, 128);
        self.lora_dropout = self.lora_dropout.clamp(0.0, 0.1);
        self
    }
}

/// One completed (or in-flight) search trial, as reported back by the
/// external trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterTrial {
    /// The configuration tried.
    pub config: Hyperparameters,
    /// The validation objective achieved (higher is better).
    pub objective: f64,
}

/// Tracks the best-seen trial per artifact type.
#[derive(Debug, Clone, Default)]
pub struct HyperparameterHistory {
    trials: Vec<HyperparameterTrial>,
}

impl HyperparameterHistory {
    /// Record a completed trial.
    pub fn record(&mut self, trial: HyperparameterTrial) {
        self.trials.push(trial);
    }

    /// Best-seen configuration, or the documented default if no trial has
    /// completed yet (§4.7.6 `LoadBest`).
    #[must_use]
    pub fn best(&self) -> Hyperparameters {
        self.trials
            .iter()
            .max_by(|a, b| a.objective.partial_cmp(&b.objective).unwrap_or(std::cmp::Ordering::Equal))
            .map_or_else(Hyperparameters::default, |t| t.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_within_documented_bounds() {
        let defaults = Hyperparameters::default();
        assert_eq!(defaults, defaults.clamped());
    }

    #[test]
    fn best_falls_back_to_default_with_no_trials() {
        let history = HyperparameterHistory::default();
        assert_eq!(history.best(), Hyperparameters::default());
    }

    #[test]
    fn best_picks_highest_objective() {
        let mut history = HyperparameterHistory::default();
        history.record(HyperparameterTrial {
            config: Hyperparameters {
                learning_rate: 1e-4,
                ..Hyperparameters::default()
            },
            objective: 0.5,
        });
        history.record(HyperparameterTrial {
            config: Hyperparameters {
                learning_rate: 5e-4,
                ..Hyperparameters::default()
            },
            objective: 0.9,
        });
        assert!((history.best().learning_rate - 5e-4).abs() < 1e-12);
    }

    #[test]
    fn clamped_pulls_out_of_range_values_into_bounds() {
        let wild = Hyperparameters {
            learning_rate: 10.0,
            batch_size: 1000,
            num_epochs: 0,
            warmup_ratio: 1.0,
            lora_r: 1,
            lora_alpha: 1000,
            lora_dropout: 1.0,
        }
        .clamped();
        assert!(wild.learning_rate <= 1e-3);
        assert!(wild.batch_size <= 64);
        assert!(wild.num_epochs >= 1);
    }
}
