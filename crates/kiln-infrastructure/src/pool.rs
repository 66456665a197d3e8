//! File-backed Finetuning Pool (§4.7, §6): one JSON array per artifact
//! type under `finetuning_pool/`, guarded by a per-type mutex (§5).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use kiln_domain::entities::{FeedbackType, TrainingExample, TrainingExampleSource};
use kiln_domain::ports::FinetuningPoolPort;
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::Result;
use tokio::sync::Mutex;

use crate::storage::{read_json, write_json_atomic};

/// File-backed [`FinetuningPoolPort`], gating admission on
/// `pool_admission_floor` independently of any caller-side check (§9 "not
/// entirely consistent across callsites" — treated as its own layer), plus
/// an extra floor of 80 for `success`-sourced examples regardless of where
/// `admission_floor` is configured (§4.7).
pub struct FilePool {
    root: PathBuf,
    admission_floor: u8,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FilePool {
    /// Open (or create) a pool store rooted at `root/finetuning_pool/`,
    /// rejecting admission below `admission_floor`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, admission_floor: u8) -> Self {
        Self {
            root: root.into(),
            admission_floor,
            locks: DashMap::new(),
        }
    }

    fn path_for(&self, artifact_type: &ArtifactType) -> PathBuf {
        self.root.join("finetuning_pool").join(format!("{}.json", artifact_type.as_str()))
    }

    fn lock_for(&self, artifact_type: &ArtifactType) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(artifact_type.as_str().to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}

#[async_trait]
impl FinetuningPoolPort for FilePool {
    async fn add(&self, example: TrainingExample) -> Result<bool> {
        if example.is_generic_content || example.quality_score < f64::from(self.admission_floor) {
            return Ok(false);
        }
        if example.feedback_type == Some(FeedbackType::Success) && example.quality_score < 80.0 {
            return Ok(false);
        }

        let lock = self.lock_for(&example.artifact_type);
        let _guard = lock.lock().await;

        let path = self.path_for(&example.artifact_type);
        let mut examples: Vec<TrainingExample> = read_json(&path).await?;
        examples.push(example.clone());
        write_json_atomic(&path, &examples).await?;
        Ok(true)
    }

    async fn examples(&self, artifact_type: &ArtifactType) -> Result<Vec<TrainingExample>> {
        read_json(&self.path_for(artifact_type)).await
    }

    async fn size(&self, artifact_type: &ArtifactType) -> Result<usize> {
        let examples: Vec<TrainingExample> = read_json(&self.path_for(artifact_type)).await?;
        Ok(examples.len())
    }

    async fn remove(&self, artifact_type: &ArtifactType, examples: &[TrainingExample]) -> Result<()> {
        let lock = self.lock_for(artifact_type);
        let _guard = lock.lock().await;

        let path = self.path_for(artifact_type);
        let mut current: Vec<TrainingExample> = read_json(&path).await?;
        current.retain(|e| !examples.iter().any(|removed| removed.input == e.input && removed.output == e.output));
        write_json_atomic(&path, &current).await?;
        Ok(())
    }

    async fn clear_synthetic(&self, artifact_type: &ArtifactType) -> Result<usize> {
        let lock = self.lock_for(artifact_type);
        let _guard = lock.lock().await;

        let path = self.path_for(artifact_type);
        let mut current: Vec<TrainingExample> = read_json(&path).await?;
        let before = current.len();
        current.retain(|e| e.source != TrainingExampleSource::Synthetic);
        let removed = before - current.len();
        write_json_atomic(&path, &current).await?;
        Ok(removed)
    }

    async fn clear_all(&self, artifact_type: &ArtifactType) -> Result<usize> {
        let lock = self.lock_for(artifact_type);
        let _guard = lock.lock().await;

        let path = self.path_for(artifact_type);
        let current: Vec<TrainingExample> = read_json(&path).await?;
        let count = current.len();
        write_json_atomic(&path, &Vec::<TrainingExample>::new()).await?;
        Ok(count)
    }
}
