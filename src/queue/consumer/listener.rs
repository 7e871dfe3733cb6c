use std::collections::BTreeSet;

use tokio::time;
use tokio_postgres::Notification;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::queue::{
    client::QueueClient,
    connection::ListenerConnection,
    consumer::{
        engine::BatchOutcome, registration::QueueRegistration, stats::StatsCounters,
    },
    error::Result,
    operations::ClaimRequest,
    utils::parse_payload,
};

/// Waits for notifications on one queue and processes what they announce.
///
/// Runs until `shutdown` is cancelled (returns `Ok`) or anything fails
/// (returns the error, leaving recovery to the supervisor).
pub struct Listener<'a> {
    client: &'a QueueClient,
    registration: &'a QueueRegistration,
    stats: &'a StatsCounters,
}

impl<'a> Listener<'a> {
    pub(crate) fn new(
        client: &'a QueueClient,
        registration: &'a QueueRegistration,
        stats: &'a StatsCounters,
    ) -> Self {
        Self {
            client,
            registration,
            stats,
        }
    }

    /// Listen on `connection` until shutdown or failure
    pub async fn run(
        &self,
        mut connection: ListenerConnection,
        shutdown: &CancellationToken,
    ) -> Result<()> {
        let queue = self.registration.name();
        let options = self.registration.options();

        connection.listen(queue).await?;
        info!(queue, "Waiting for notifications");

        // Messages committed while nobody was listening never notify us
        self.sweep(shutdown).await?;

        loop {
            let waited = tokio::select! {
                _ = shutdown.cancelled() => break,
                waited = time::timeout(options.poll_timeout, connection.recv()) => waited,
            };

            let request = match waited {
                Err(_elapsed) => {
                    debug!(queue, "no notifications before timeout, re-polling");
                    self.sweep(shutdown).await?;
                    continue;
                }
                Ok(first) => {
                    let mut ids = BTreeSet::new();
                    self.collect(first?, &mut ids);
                    while let Some(next) = connection.try_recv() {
                        self.collect(next?, &mut ids);
                    }
                    if ids.is_empty() {
                        continue;
                    }
                    ClaimRequest::ids(ids)
                }
            };

            // Notified ids past the batch size are left to a sweep
            let outcome = self.process(request).await?;
            if self.is_full(&outcome) {
                self.sweep(shutdown).await?;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = time::sleep(options.batch_pause) => {}
            }
        }

        info!(queue, "Listener stopped");
        connection.close();
        Ok(())
    }

    fn collect(&self, notification: Notification, ids: &mut BTreeSet<i64>) {
        if notification.channel() != self.registration.name() {
            debug!(channel = notification.channel(), "ignoring notification for another channel");
            return;
        }

        match parse_payload(notification.payload()) {
            Some(id) => {
                ids.insert(id);
            }
            None => warn!(
                queue = self.registration.name(),
                payload = notification.payload(),
                "ignoring notification with a non-numeric payload"
            ),
        }
    }

    /// Claim pending rows batch after batch until the backlog is gone.
    ///
    /// Stops early on shutdown, or when a full batch only produced failures
    /// so the same rows would be claimed again.
    async fn sweep(&self, shutdown: &CancellationToken) -> Result<()> {
        loop {
            let outcome = self.process(ClaimRequest::pending()).await?;

            if !self.is_full(&outcome) || outcome.processed.is_empty() || shutdown.is_cancelled() {
                return Ok(());
            }
            debug!(queue = self.registration.name(), claimed = outcome.claimed, "batch full, sweeping again");
        }
    }

    fn is_full(&self, outcome: &BatchOutcome) -> bool {
        matches!(self.registration.options().batch_size, Some(limit) if outcome.claimed as i64 >= limit)
    }

    async fn process(&self, request: ClaimRequest) -> Result<BatchOutcome> {
        let outcome = self.client.process_batch(self.registration, &request).await?;
        if !outcome.is_empty() {
            self.stats
                .record_batch(outcome.processed.len(), outcome.failed.len());
        }
        Ok(outcome)
    }
}
