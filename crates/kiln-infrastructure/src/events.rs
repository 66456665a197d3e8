//! In-process, per-job Event Bus (§4.5), grounded on the teacher's broadcast
//! event bus adapter but keyed per `JobId` and retaining the terminal event
//! so late subscribers still observe it (§4.5 invariant).

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use kiln_domain::events::JobEvent;
use kiln_domain::ports::{EventBus, EventStream};
use kiln_domain::value_objects::JobId;
use tokio::sync::{broadcast, RwLock};

struct Topic {
    sender: broadcast::Sender<JobEvent>,
    terminal: RwLock<Option<JobEvent>>,
}

impl Topic {
    fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender,
            terminal: RwLock::new(None),
        }
    }
}

/// Broadcast-backed [`EventBus`], one topic per job, pruned once a job's
/// terminal event has been published and no subscribers remain attached.
pub struct InProcessEventBus {
    topics: DashMap<JobId, Arc<Topic>>,
    buffer_size: usize,
}

impl InProcessEventBus {
    /// Create an empty bus with `buffer_size`-deep per-job channels
    /// (§5 "bounded buffers").
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            topics: DashMap::new(),
            buffer_size,
        }
    }

    fn topic_for(&self, job_id: JobId) -> Arc<Topic> {
        Arc::clone(
            self.topics
                .entry(job_id)
                .or_insert_with(|| Arc::new(Topic::new(self.buffer_size)))
                .value(),
        )
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventBus for InProcessEventBus {
    async fn publish(&self, event: JobEvent) {
        let job_id = event.job_id();
        let topic = self.topic_for(job_id);
        if event.is_terminal() {
            *topic.terminal.write().await = Some(event.clone());
        }
        // No subscribers is a normal, expected state (no one streaming this
        // job yet); `send` erroring here is not a failure to log.
        let _ = topic.sender.send(event);

        if topic.terminal.read().await.is_some() && topic.sender.receiver_count() == 0 {
            self.topics.remove(&job_id);
        }
    }

    async fn subscribe(&self, job_id: JobId) -> EventStream {
        let topic = self.topic_for(job_id);

        if let Some(terminal) = topic.terminal.read().await.clone() {
            return stream::iter(vec![terminal]).boxed();
        }

        let receiver = topic.sender.subscribe();
        let events = stream::unfold(receiver, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        // Stop after the terminal event even though the broadcast channel
        // itself stays open for other subscribers.
        events
            .scan(false, |done, event| {
                if *done {
                    return std::future::ready(None);
                }
                *done = event.is_terminal();
                std::future::ready(Some(event))
            })
            .boxed()
    }
}
