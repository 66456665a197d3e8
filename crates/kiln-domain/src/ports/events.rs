//! Event Bus port (§4.5, §6).

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::events::JobEvent;
use crate::value_objects::JobId;

/// A lazy, finite stream of events for one job, terminating after the
/// terminal event (§4.1 `Stream`).
pub type EventStream = BoxStream<'static, JobEvent>;

/// Contract for the per-job event bus (§4.5).
///
/// Implementations MUST uphold: within a job, `started` precedes any
/// `progress`/`chunk`, which precede exactly one terminal event; a
/// subscriber attaching after the terminal event still observes that
/// terminal event; a slow subscriber may miss intermediate
/// `progress`/`chunk` events but never `started`, `complete`, or `error`.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event for its job.
    async fn publish(&self, event: JobEvent);

    /// Subscribe to a job's event stream.
    async fn subscribe(&self, job_id: JobId) -> EventStream;
}
