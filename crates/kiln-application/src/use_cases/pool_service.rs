//! Finetuning Pool use case (§4.7, §6): `GetPoolStats`/`TriggerMajor`/
//! `ClearPool`, layered over the pool and hard-negative stores.

use std::sync::Arc;

use kiln_domain::entities::{TrainingBatch, TrainingExampleSource};
use kiln_domain::ports::{FinetuningPoolPort, HardNegativeStorePort, HyperparameterStorePort};
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::{Error, Result};

use crate::config::KilnConfig;
use crate::training::{
    batch_sizer::BatchSizerBounds, emit_batch, EmissionRequest, EmissionTrigger,
    HyperparameterHistory, HyperparameterTrial, Hyperparameters, QualityTrend,
};

/// `GetPoolStats` response shape (§6).
pub struct PoolStats {
    /// Pool size for this type.
    pub size: usize,
    /// How many pooled examples are `synthetic`-sourced (augmented or
    /// hard-negative-derived) rather than real feedback.
    pub synthetic_count: usize,
    /// Pool size at which the next incremental batch would fire.
    pub incremental_threshold: usize,
    /// Pool size at which a major batch would fire.
    pub major_threshold: usize,
}

/// Composition-root-wired use case over the finetuning pool.
pub struct PoolService {
    pool: Arc<dyn FinetuningPoolPort>,
    hard_negatives: Arc<dyn HardNegativeStorePort>,
    hyperparameters: Arc<dyn HyperparameterStorePort>,
    config: Arc<KilnConfig>,
}

impl PoolService {
    /// Wire a pool service from its collaborators.
    #[must_use]
    pub fn new(
        pool: Arc<dyn FinetuningPoolPort>,
        hard_negatives: Arc<dyn HardNegativeStorePort>,
        hyperparameters: Arc<dyn HyperparameterStorePort>,
        config: Arc<KilnConfig>,
    ) -> Self {
        Self {
            pool,
            hard_negatives,
            hyperparameters,
            config,
        }
    }

    /// `GetPoolStats(type?)` (§6).
    pub async fn stats(&self, artifact_type: &ArtifactType) -> Result<PoolStats> {
        let examples = self.pool.examples(artifact_type).await?;
        let synthetic_count = examples
            .iter()
            .filter(|e| e.source == TrainingExampleSource::Synthetic)
            .count();
        Ok(PoolStats {
            size: examples.len(),
            synthetic_count,
            incremental_threshold: self.config.pool.incremental_threshold,
            major_threshold: self.config.pool.major_threshold,
        })
    }

    /// `TriggerMajor(type)` (§6, §8): succeeds iff pool size is at or above
    /// the major threshold, then emits a batch exactly as an organic
    /// threshold crossing would.
    pub async fn trigger_major(&self, artifact_type: &ArtifactType) -> Result<TrainingBatch> {
        let size = self.pool.size(artifact_type).await?;
        if size < self.config.pool.major_threshold {
            return Err(Error::invalid_request(format!(
                "pool for {} has {size} examples, below major threshold {}",
                artifact_type.as_str(),
                self.config.pool.major_threshold
            )));
        }

        let pool_examples = self.pool.examples(artifact_type).await?;
        let failures = self.hard_negatives.all(Some(artifact_type)).await?;

        let mut history = HyperparameterHistory::default();
        if let Some(config_json) = self.hyperparameters.load_best(artifact_type).await? {
            if let Ok(config) = serde_json::from_value::<Hyperparameters>(config_json) {
                history.record(HyperparameterTrial { config, objective: 1.0 });
            }
        }

        let request = EmissionRequest {
            artifact_type: artifact_type.clone(),
            cumulative_seen: pool_examples.len(),
            pool: pool_examples.clone(),
            failures: &failures,
            trend: QualityTrend::Flat,
            trigger: EmissionTrigger::Major,
            augmentation_factor: self.config.pool.augmentation_factor,
            bounds: BatchSizerBounds {
                min_batch: self.config.pool.min_batch,
                max_batch: self.config.pool.max_batch,
            },
            quality_target: self.config.pool.quality_target,
            hyperparameters: &history,
        };

        let batch = emit_batch(request).ok_or_else(|| {
            Error::internal("pool cleared the major threshold but batch emission yielded nothing")
        })?;
        Ok(batch)
    }

    /// `ClearPool(type)` (§6): drop everything buffered for a type.
    pub async fn clear(&self, artifact_type: &ArtifactType) -> Result<usize> {
        self.pool.clear_all(artifact_type).await
    }
}
