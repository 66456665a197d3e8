//! File-backed Performance Tracker persistence (§4.8, §6):
//! `performance/performance_history.json` (append-mostly history) and
//! `performance/best_models.json` (per-type best pointer).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_domain::entities::PerformanceMetrics;
use kiln_domain::ports::PerformanceStorePort;
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::Result;
use tokio::sync::Mutex;

use crate::storage::{read_json, write_json_atomic};

/// File-backed [`PerformanceStorePort`].
pub struct FilePerformanceStore {
    history_path: PathBuf,
    best_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FilePerformanceStore {
    /// Open (or create) a performance store under `root/performance/`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into().join("performance");
        Self {
            history_path: root.join("performance_history.json"),
            best_path: root.join("best_models.json"),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn best_key(artifact_type: &ArtifactType) -> String {
        artifact_type.as_str().to_owned()
    }
}

#[async_trait]
impl PerformanceStorePort for FilePerformanceStore {
    async fn record(&self, metrics: PerformanceMetrics) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut history: Vec<PerformanceMetrics> = read_json(&self.history_path).await?;
        let mut best: HashMap<String, PerformanceMetrics> = read_json(&self.best_path).await?;

        let key = Self::best_key(&metrics.artifact_type);
        let is_new_best = best.get(&key).is_none_or(|current| metrics.dominates(current));
        if is_new_best {
            best.insert(key, metrics.clone());
        }
        history.push(metrics);

        write_json_atomic(&self.history_path, &history).await?;
        write_json_atomic(&self.best_path, &best).await
    }

    async fn trend(&self, artifact_type: &ArtifactType, last_n: Option<usize>) -> Result<Vec<PerformanceMetrics>> {
        let history: Vec<PerformanceMetrics> = read_json(&self.history_path).await?;
        let mut matched: Vec<PerformanceMetrics> =
            history.into_iter().filter(|m| &m.artifact_type == artifact_type).collect();
        matched.sort_by_key(|m| m.timestamp);
        if let Some(n) = last_n {
            let skip = matched.len().saturating_sub(n);
            matched.drain(0..skip);
        }
        Ok(matched)
    }

    async fn best(&self, artifact_type: &ArtifactType) -> Result<Option<PerformanceMetrics>> {
        let best: HashMap<String, PerformanceMetrics> = read_json(&self.best_path).await?;
        Ok(best.get(&Self::best_key(artifact_type)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(score: f64, ts: i64) -> PerformanceMetrics {
        PerformanceMetrics {
            model_id: "local-default".into(),
            artifact_type: ArtifactType::new("mermaid_erd"),
            avg_validation_score: score,
            success_rate: 0.9,
            avg_reward: 0.5,
            avg_latency_ms: 500.0,
            n_samples: 10,
            timestamp: ts,
        }
    }

    #[tokio::test]
    async fn best_tracks_dominance() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePerformanceStore::new(dir.path());
        let ty = ArtifactType::new("mermaid_erd");

        store.record(metrics(80.0, 1)).await.unwrap();
        store.record(metrics(70.0, 2)).await.unwrap();
        store.record(metrics(95.0, 3)).await.unwrap();

        let best = store.best(&ty).await.unwrap().unwrap();
        assert_eq!(best.timestamp, 3);
        assert_eq!(store.trend(&ty, None).await.unwrap().len(), 3);
        assert_eq!(store.trend(&ty, Some(2)).await.unwrap().len(), 2);
    }
}
