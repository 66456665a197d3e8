//! File-backed best-hyperparameters store (§4.7.6, §6):
//! `hyperparams/best_params_<type>.json`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use kiln_domain::ports::HyperparameterStorePort;
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::Result;
use tokio::sync::Mutex;

use crate::storage::{read_json, write_json_atomic};

/// File-backed [`HyperparameterStorePort`], one file per artifact type.
pub struct FileHyperparameterStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileHyperparameterStore {
    /// Open (or create) a hyperparameter store rooted at `root/hyperparams/`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    fn path_for(&self, artifact_type: &ArtifactType) -> PathBuf {
        self.root.join("hyperparams").join(format!("best_params_{}.json", artifact_type.as_str()))
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
impl HyperparameterStorePort for FileHyperparameterStore {
    async fn save_best(&self, artifact_type: &ArtifactType, config: serde_json::Value) -> Result<()> {
        let lock = self.lock_for(artifact_type);
        let _guard = lock.lock().await;
        write_json_atomic(&self.path_for(artifact_type), &config).await
    }

    async fn load_best(&self, artifact_type: &ArtifactType) -> Result<Option<serde_json::Value>> {
        let path = self.path_for(artifact_type);
        if !path.exists() {
            return Ok(None);
        }
        let value: serde_json::Value = read_json(&path).await?;
        Ok(Some(value))
    }
}
