//! File-backed Feedback Store (§4.6, §6): a single append-only JSONL log
//! at `feedback/events.jsonl`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_domain::entities::FeedbackEvent;
use kiln_domain::ports::FeedbackStorePort;
use kiln_domain::value_objects::ArtifactType;
use kiln_domain::Result;
use tokio::sync::Mutex;

use crate::storage::{append_jsonl, read_jsonl};

/// File-backed [`FeedbackStorePort`] over a single append-only log, guarded
/// by one mutex for the whole file (§5 "per-file mutex").
pub struct FileFeedbackStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileFeedbackStore {
    /// Open (or create) a feedback store at `root/feedback/events.jsonl`.
    #[must_use]
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: root.into().join("feedback").join("events.jsonl"),
            lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl FeedbackStorePort for FileFeedbackStore {
    async fn append(&self, event: FeedbackEvent) -> Result<()> {
        let _guard = self.lock.lock().await;
        append_jsonl(&self.path, &event).await
    }

    async fn history(&self, artifact_type: &ArtifactType) -> Result<Vec<FeedbackEvent>> {
        let all: Vec<FeedbackEvent> = read_jsonl(&self.path).await?;
        Ok(all.into_iter().filter(|e| &e.artifact_type == artifact_type).collect())
    }

    async fn all(&self) -> Result<Vec<FeedbackEvent>> {
        read_jsonl(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_domain::entities::FeedbackType;
    use kiln_domain::value_objects::ArtifactId;

    fn event(ty: &str, score: u8) -> FeedbackEvent {
        FeedbackEvent {
            artifact_id: ArtifactId::from_raw("x"),
            artifact_type: ArtifactType::new(ty),
            feedback_type: FeedbackType::Positive,
            score,
            ai_output: "out".into(),
            corrected_content: None,
            timestamp: 0,
            context: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn append_and_filter_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFeedbackStore::new(dir.path());

        store.append(event("mermaid_erd", 90)).await.unwrap();
        store.append(event("mermaid_flowchart", 60)).await.unwrap();

        let erd_only = store.history(&ArtifactType::new("mermaid_erd")).await.unwrap();
        assert_eq!(erd_only.len(), 1);
        assert_eq!(store.all().await.unwrap().len(), 2);
    }
}
