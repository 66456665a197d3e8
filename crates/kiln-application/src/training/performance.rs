//! Performance Tracker (§4.8).

use std::collections::HashMap;

use kiln_domain::entities::{PerformanceMetrics, TrainingExample};

/// Minimum validation examples carved out per stratum, even when 20% of a
/// stratum would round lower (§4.8 "ceiling `min_validation_samples=10`").
pub const MIN_VALIDATION_SAMPLES: usize = 10;

/// A minimal, dependency-free linear congruential generator, used only to
/// deterministically permute examples within a stratum (§4.8 "deterministic
/// under a fixed seed"). Not suitable for anything security-sensitive.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

/// Stratified 80/20 train/validation split, deterministic for a given
/// `seed` (§4.8 `SplitTrainVal`).
#[must_use]
pub fn split_train_val(
    examples: Vec<TrainingExample>,
    seed: u64,
) -> (Vec<TrainingExample>, Vec<TrainingExample>) {
    let mut by_type: HashMap<String, Vec<TrainingExample>> = HashMap::new();
    for example in examples {
        by_type
            .entry(example.artifact_type.as_str().to_owned())
            .or_default()
            .push(example);
    }

    let mut train = Vec::new();
    let mut val = Vec::new();

    let mut types: Vec<_> = by_type.into_iter().collect();
    types.sort_by(|a, b| a.0.cmp(&b.0));

    for (idx, (_, mut stratum)) in types.into_iter().enumerate() {
        let mut rng = Lcg(seed.wrapping_add(idx as u64).max(1));
        rng.shuffle(&mut stratum);

        let val_count = ((stratum.len() as f64 * 0.2).round() as usize).min(MIN_VALIDATION_SAMPLES).max(1).min(stratum.len());
        let (stratum_val, stratum_train) = stratum.split_at(val_count);
        val.extend(stratum_val.iter().cloned());
        train.extend(stratum_train.iter().cloned());
    }

    (train, val)
}

/// Per-type performance history and best-pointer tracking.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    history: HashMap<String, Vec<PerformanceMetrics>>,
    best: HashMap<String, PerformanceMetrics>,
}

impl PerformanceTracker {
    /// Append `metrics` to its type's history and update the best-per-type
    /// pointer using the dominance order (§4.8 `Record`).
    pub fn record(&mut self, metrics: PerformanceMetrics) {
        let key = metrics.artifact_type.as_str().to_owned();
        let is_new_best = self
            .best
            .get(&key)
            .is_none_or(|current| metrics.dominates(current));
        if is_new_best {
            self.best.insert(key.clone(), metrics.clone());
        }
        self.history.entry(key).or_default().push(metrics);
    }

    /// Time-ordered history for `artifact_type`, optionally limited to the
    /// most recent `last_n` entries (§4.8 `Trend`).
    #[must_use]
    pub fn trend(&self, artifact_type: &str, last_n: Option<usize>) -> Vec<PerformanceMetrics> {
        let Some(series) = self.history.get(artifact_type) else {
            return Vec::new();
        };
        match last_n {
            Some(n) if n < series.len() => series[series.len() - n..].to_vec(),
            _ => series.clone(),
        }
    }

    /// Best-seen metrics for `artifact_type`, if any have been recorded.
    #[must_use]
    pub fn best(&self, artifact_type: &str) -> Option<&PerformanceMetrics> {
        self.best.get(artifact_type)
    }

    /// `true` iff none of the last `patience` evaluations improved the
    /// running best by at least `min_improvement` (§4.8 `ShouldEarlyStop`).
    #[must_use]
    pub fn should_early_stop(&self, artifact_type: &str, patience: usize, min_improvement: f64) -> bool {
        let Some(series) = self.history.get(artifact_type) else {
            return false;
        };
        if series.len() < patience {
            return false;
        }

        let window = &series[series.len() - patience..];
        let mut running_best = series[..series.len() - patience]
            .iter()
            .map(|m| m.avg_validation_score)
            .fold(f64::MIN, f64::max);

        for metrics in window {
            if metrics.avg_validation_score - running_best >= min_improvement {
                return false;
            }
            running_best = running_best.max(metrics.avg_validation_score);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_domain::value_objects::ArtifactType;

    fn example(ty: &str) -> TrainingExample {
        TrainingExample {
            artifact_type: ArtifactType::new(ty),
            instruction: "x".to_owned(),
            input: "y".to_owned(),
            output: "z".to_owned(),
            quality_score: 90.0,
            source: kiln_domain::entities::TrainingExampleSource::Feedback,
            feedback_type: None,
            category: None,
            difficulty: None,
            is_generic_content: false,
        }
    }

    fn metrics(ty: &str, score: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            model_id: "m1".to_owned(),
            artifact_type: ArtifactType::new(ty),
            avg_validation_score: score,
            success_rate: 0.9,
            avg_reward: 0.5,
            avg_latency_ms: 100.0,
            n_samples: 10,
            timestamp: 0,
        }
    }

    #[test]
    fn split_is_deterministic_for_same_seed() {
        let examples: Vec<_> = (0..40).map(|_| example("mermaid_erd")).collect();
        let (train_a, val_a) = split_train_val(examples.clone(), 42);
        let (train_b, val_b) = split_train_val(examples, 42);
        assert_eq!(train_a.len(), train_b.len());
        assert_eq!(val_a.len(), val_b.len());
    }

    #[test]
    fn split_is_roughly_eighty_twenty() {
        let examples: Vec<_> = (0..100).map(|_| example("mermaid_erd")).collect();
        let (train, val) = split_train_val(examples, 1);
        assert_eq!(train.len() + val.len(), 100);
        assert_eq!(val.len(), MIN_VALIDATION_SAMPLES);
    }

    #[test]
    fn tracker_updates_best_via_dominance() {
        let mut tracker = PerformanceTracker::default();
        tracker.record(metrics("mermaid_erd", 70.0));
        tracker.record(metrics("mermaid_erd", 90.0));
        tracker.record(metrics("mermaid_erd", 80.0));
        assert_eq!(tracker.best("mermaid_erd").unwrap().avg_validation_score, 90.0);
        assert_eq!(tracker.trend("mermaid_erd", None).len(), 3);
    }

    #[test]
    fn early_stop_triggers_after_stagnant_window() {
        let mut tracker = PerformanceTracker::default();
        tracker.record(metrics("mermaid_erd", 80.0));
        tracker.record(metrics("mermaid_erd", 80.1));
        tracker.record(metrics("mermaid_erd", 80.05));
        tracker.record(metrics("mermaid_erd", 80.0));
        assert!(tracker.should_early_stop("mermaid_erd", 3, 1.0));
    }

    #[test]
    fn early_stop_does_not_trigger_with_real_improvement() {
        let mut tracker = PerformanceTracker::default();
        tracker.record(metrics("mermaid_erd", 60.0));
        tracker.record(metrics("mermaid_erd", 70.0));
        tracker.record(metrics("mermaid_erd", 85.0));
        assert!(!tracker.should_early_stop("mermaid_erd", 2, 1.0));
    }
}
