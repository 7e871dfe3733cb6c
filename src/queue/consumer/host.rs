use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info_span, Instrument};

use crate::queue::consumer::{
    stats::{ConsumerStats, StatsCounters},
    supervisor::Supervisor,
};

/// Handle to a consumer running in the background.
///
/// Dropping the handle detaches the task; it keeps running until the process
/// exits or [`stop`](Self::stop) is called through another clone of its token.
pub struct BackgroundHandle {
    queue: String,
    consumer_id: String,
    shutdown: CancellationToken,
    stats: Arc<StatsCounters>,
    task: JoinHandle<()>,
}

impl BackgroundHandle {
    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// Current counters of the consumer
    pub fn stats(&self) -> ConsumerStats {
        self.stats.snapshot()
    }

    /// Token that stops the consumer when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask the consumer to stop without waiting for it
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Stop the consumer and wait until its task has finished
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!(queue = %self.queue, error = %e, "queue consumer task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run a supervisor on its own task, detached from any request.
///
/// Must be called from within a tokio runtime.
pub fn spawn(supervisor: Supervisor) -> BackgroundHandle {
    let queue = supervisor.queue().to_string();
    let consumer_id = supervisor.consumer_id().to_string();
    let shutdown = supervisor.shutdown_token();
    let stats = supervisor.stats();

    let span = info_span!("queue_consumer", queue = %queue, consumer_id = %consumer_id);
    let task = tokio::spawn(supervisor.run().instrument(span));

    BackgroundHandle {
        queue,
        consumer_id,
        shutdown,
        stats,
        task,
    }
}
