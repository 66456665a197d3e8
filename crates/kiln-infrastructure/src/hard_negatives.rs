//! File-backed hard-negative log (§4.7.4, §6): append-only JSONL at
//! `hard_negatives/failure_cases.jsonl`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_domain::entities::FailureCase;
use kiln_domain::ports::HardNegativeStorePort;
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::Result;
use tokio::sync::Mutex;

use crate::storage::{append_jsonl, read_jsonl};

/// File-backed [`HardNegativeStorePort`] over a single append-only log.
pub struct FileHardNegativeStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileHardNegativeStore {
    /// Open (or create) a hard-negative log at
    /// `root/hard_negatives/failure_cases.jsonl`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            path: root.into().join("hard_negatives").join("failure_cases.jsonl"),
            lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl HardNegativeStorePort for FileHardNegativeStore {
    async fn append(&self, case: FailureCase) -> Result<()> {
        let _guard = self.lock.lock().await;
        append_jsonl(&self.path, &case).await
    }

    async fn all(&self, artifact_type: Option<&ArtifactType>) -> Result<Vec<FailureCase>> {
        let all: Vec<FailureCase> = read_jsonl(&self.path).await?;
        Ok(match artifact_type {
            Some(ty) => all.into_iter().filter(|c| &c.artifact_type == ty).collect(),
            None => all,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(ty: &str, score: u8) -> FailureCase {
        FailureCase {
            artifact_type: ArtifactType::new(ty),
            input: "notes".into(),
            output: "not a diagram".into(),
            validation_score: score,
            failure_type: "missing_keyword".into(),
            complexity_factors: vec![0.3],
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn append_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHardNegativeStore::new(dir.path());

        store.append(case("mermaid_erd", 20)).await.unwrap();
        store.append(case("api_docs", 30)).await.unwrap();

        let erd_only = store.all(Some(&ArtifactType::new("mermaid_erd"))).await.unwrap();
        assert_eq!(erd_only.len(), 1);
        assert_eq!(store.all(None).await.unwrap().len(), 2);
    }
}
