use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::queue::{
    client::QueueClient,
    consumer::{listener::Listener, registration::QueueRegistration, stats::StatsCounters},
    error::{Error, Result},
};

/// Keeps a listener running for one queue.
///
/// Every failure (lost connection, handler error, protocol error) is logged,
/// followed by a fixed delay and a fresh connection. There is no backoff and
/// no retry ceiling: a message whose handler always fails is retried on every
/// pass until someone fixes the handler.
pub struct Supervisor {
    client: QueueClient,
    registration: QueueRegistration,
    consumer_id: String,
    shutdown: CancellationToken,
    stats: Arc<StatsCounters>,
}

impl Supervisor {
    pub fn new(client: QueueClient, registration: QueueRegistration) -> Self {
        Self {
            client,
            registration,
            consumer_id: format!("q-{}", Uuid::new_v4().simple()),
            shutdown: CancellationToken::new(),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Use a specific consumer id, reported as the listener's application name
    pub fn with_consumer_id(mut self, consumer_id: impl Into<String>) -> Self {
        self.consumer_id = consumer_id.into();
        self
    }

    /// Stop when `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    pub fn queue(&self) -> &str {
        self.registration.name()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub(crate) fn stats(&self) -> Arc<StatsCounters> {
        Arc::clone(&self.stats)
    }

    /// Run until the shutdown token is cancelled
    pub async fn run(self) {
        info!("Queue consumer started");

        while !self.shutdown.is_cancelled() {
            let result = self.run_once().await;

            if self.shutdown.is_cancelled() {
                // Errors while stopping are expected, most likely a closed connection
                if let Err(e) = result {
                    debug!(error = %e, "ignoring error during shutdown");
                }
                break;
            }

            let error = match result {
                Ok(()) => continue,
                Err(e) => e,
            };

            if matches!(error, Error::HandlerError { .. }) {
                self.stats.record_handler_failure();
            }
            self.stats.record_restart(&error.to_string());
            let retry_in = self.registration.options().retry_delay;
            warn!(
                error = %error,
                kind = failure_kind(&error),
                ?retry_in,
                "Listener failed, restarting"
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = time::sleep(retry_in) => {}
            }
        }

        info!("Queue consumer stopped");
    }

    async fn run_once(&self) -> Result<()> {
        let connection = self.client.provider().connect(&self.consumer_id).await?;
        self.stats.record_connection();

        Listener::new(&self.client, &self.registration, &self.stats)
            .run(connection, &self.shutdown)
            .await
    }
}

/// Short label for what took the listener down
fn failure_kind(error: &Error) -> &'static str {
    match error {
        Error::HandlerError { .. } => "handler",
        e if e.is_connection_error() => "connection",
        Error::DatabaseError(_) | Error::TransactionError(_) => "database",
        _ => "other",
    }
}
