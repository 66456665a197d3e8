//! Orchestration policy configuration.
//!
//! Kept as plain, `Default`-able data so the application layer never needs
//! to depend on a configuration-loading crate; `kiln-infrastructure` is
//! responsible for populating this from TOML + environment layers and
//! handing the resolved struct to the composition root (SPEC_FULL §2).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One rung of the retry/fallback ladder for a given artifact type (§4.1.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderRung {
    /// The model id to call on this rung.
    pub model_id: String,
    /// `true` if a repair re-prompt should be attempted on this rung before
    /// advancing.
    pub allow_repair: bool,
}

/// Validator score thresholds (§9 "validator thresholds" — intentionally
/// independent, not unified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum score for `is_valid` (§4.3).
    pub is_valid: u8,
    /// Minimum score for the orchestrator to accept a candidate (§4.1).
    pub acceptance: u8,
    /// Minimum normalized feedback score for pool admission floor (§4.7).
    pub pool_admission_floor: u8,
    /// Score at which pool admission is the *target* (§3, §4.1 step 6c).
    pub pool_admission_target: u8,
    /// Score below which a generation is captured as a `FailureCase` (§4.7.4
    /// capture rule).
    pub failure_case_capture: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            is_valid: 60,
            acceptance: 80,
            pool_admission_floor: 70,
            pool_admission_target: 85,
            failure_case_capture: 75,
        }
    }
}

/// Retry/fallback policy (§4.1, §4.1.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts budget across all rungs for a single job.
    pub max_retries: u32,
    /// Whether to run the validator and act on its verdict at all.
    pub use_validation: bool,
    /// Per-type ladder rungs, in trial order. Falls back to a single
    /// synthetic `local-default` rung for unconfigured types.
    pub rungs_by_type: HashMap<String, Vec<LadderRung>>,
}

impl RetryPolicy {
    /// Rungs configured for `artifact_type`, falling back to a minimal
    /// single-rung default so every type is at least attemptable.
    #[must_use]
    pub fn rungs_for(&self, artifact_type: &str) -> Vec<LadderRung> {
        self.rungs_by_type.get(artifact_type).cloned().unwrap_or_else(|| {
            vec![LadderRung {
                model_id: "local-default".to_owned(),
                allow_repair: true,
            }]
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 6,
            use_validation: true,
            rungs_by_type: HashMap::new(),
        }
    }
}

/// Job table bounds (§5 "job table").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTableConfig {
    /// Maximum number of jobs retained in memory.
    pub max_jobs: usize,
    /// Retention window, in seconds, before a terminal job is eligible for
    /// eviction.
    pub retention_secs: i64,
}

impl Default for JobTableConfig {
    fn default() -> Self {
        Self {
            max_jobs: 100,
            retention_secs: 3600,
        }
    }
}

/// Version Store bounds (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionStoreConfig {
    /// Maximum versions retained per `artifact_id`.
    pub max_versions_per_id: usize,
}

impl Default for VersionStoreConfig {
    fn default() -> Self {
        Self {
            max_versions_per_id: 50,
        }
    }
}

/// Finetuning Pool thresholds (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool size at which an incremental batch is emitted.
    pub incremental_threshold: usize,
    /// Pool size at which a major batch is emitted.
    pub major_threshold: usize,
    /// Minimum dynamic batch size (§4.7.1).
    pub min_batch: usize,
    /// Maximum dynamic batch size (§4.7.1).
    pub max_batch: usize,
    /// Minimum real-example count before an example is considered "rare"
    /// for rarity-multiplier purposes (§4.7.1).
    pub quality_target: f64,
    /// Augmentation expansion factor (§4.7.5).
    pub augmentation_factor: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            incremental_threshold: 50,
            major_threshold: 2000,
            min_batch: 20,
            max_batch: 100,
            quality_target: 0.9,
            augmentation_factor: 2,
        }
    }
}

/// Reward calculator tuning (§4.7.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Per-day temporal decay rate.
    pub decay_rate: f64,
    /// Difficulty boost weight (`1 + difficulty * (weight - 1)`).
    pub difficulty_weight: f64,
    /// Per-type count above which distribution balancing kicks in.
    pub balance_threshold: usize,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.95,
            difficulty_weight: 1.5,
            balance_threshold: 100,
        }
    }
}

/// Curriculum learner tuning (§4.7.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumConfig {
    /// Consecutive evaluations required to advance a stage.
    pub min_evaluations: usize,
    /// Score each of those evaluations must meet to advance.
    pub progression_score: u8,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            min_evaluations: 3,
            progression_score: 75,
        }
    }
}

/// Event bus buffer sizing (§5 "Event Bus").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Bounded buffer size per subscriber channel.
    pub buffer_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { buffer_size: 256 }
    }
}

/// Top-level orchestration configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Validator/acceptance thresholds.
    pub thresholds: Thresholds,
    /// Retry/fallback ladder policy.
    pub retry: RetryPolicy,
    /// Job table bounds.
    pub jobs: JobTableConfig,
    /// Version Store bounds.
    pub versions: VersionStoreConfig,
    /// Finetuning Pool thresholds.
    pub pool: PoolConfig,
    /// Reward calculator tuning.
    pub reward: RewardConfig,
    /// Curriculum learner tuning.
    pub curriculum: CurriculumConfig,
    /// Event bus buffer sizing.
    pub event_bus: EventBusConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_documented_values() {
        let cfg = KilnConfig::default();
        assert_eq!(cfg.thresholds.is_valid, 60);
        assert_eq!(cfg.thresholds.acceptance, 80);
        assert_eq!(cfg.thresholds.pool_admission_target, 85);
        assert_eq!(cfg.pool.incremental_threshold, 50);
        assert_eq!(cfg.pool.major_threshold, 2000);
        assert_eq!(cfg.jobs.max_jobs, 100);
        assert_eq!(cfg.jobs.retention_secs, 3600);
        assert_eq!(cfg.versions.max_versions_per_id, 50);
    }

    #[test]
    fn rungs_for_unconfigured_type_falls_back() {
        let policy = RetryPolicy::default();
        let rungs = policy.rungs_for("mermaid_erd");
        assert_eq!(rungs.len(), 1);
        assert_eq!(rungs[0].model_id, "local-default");
    }
}
