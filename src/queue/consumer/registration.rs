use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::queue::{
    error::{BoxError, Result},
    types::Message,
    utils::validate_queue_name,
};

/// Future returned by message handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = std::result::Result<(), BoxError>> + Send>>;

/// Type alias for message handler functions
///
/// Handlers perform the side effect for one message. They may see the same
/// message more than once and must treat a repeat as a no-op.
pub type MessageHandler = Arc<dyn Fn(Message) -> HandlerFuture + Send + Sync>;

/// What a handler failure does to the rest of its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Roll back the whole batch and restart the listener
    #[default]
    AbortBatch,

    /// Leave only the failed message pending and keep going
    Isolate,
}

/// Tuning for one consumer
#[derive(Debug, Clone, PartialEq)]
pub struct QueueOptions {
    /// Longest wait for a notification before re-polling the table
    pub poll_timeout: Duration,

    /// Pause after each notification-driven batch
    pub batch_pause: Duration,

    /// Delay before the supervisor reconnects after a failure
    pub retry_delay: Duration,

    /// Maximum messages claimed per batch, None for no limit
    pub batch_size: Option<i64>,

    pub failure_policy: FailurePolicy,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(60),
            batch_pause: Duration::from_secs(1),
            retry_delay: Duration::from_secs(1),
            batch_size: None,
            failure_policy: FailurePolicy::AbortBatch,
        }
    }
}

impl QueueOptions {
    /// Set the notification wait timeout (builder pattern)
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the pause after each batch (builder pattern)
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Set the reconnect delay (builder pattern)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the batch size (builder pattern)
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the failure policy (builder pattern)
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// A queue name bound to the handler that processes its messages
///
/// # Example
///
/// ```
/// use p2k16::queue::consumer::{QueueOptions, QueueRegistration};
/// use std::time::Duration;
///
/// let registration = QueueRegistration::new("ldap-sync", |msg| Box::pin(async move {
///     println!("syncing account {}", msg.entity_id);
///     Ok(())
/// }))
/// .unwrap()
/// .with_options(QueueOptions::default().with_poll_timeout(Duration::from_secs(30)));
///
/// assert_eq!(registration.name(), "ldap-sync");
/// ```
#[derive(Clone)]
pub struct QueueRegistration {
    name: String,
    handler: MessageHandler,
    options: QueueOptions,
}

impl QueueRegistration {
    /// Register `handler` for messages of queue `name`
    pub fn new<F>(name: impl Into<String>, handler: F) -> Result<Self>
    where
        F: Fn(Message) -> HandlerFuture + Send + Sync + 'static,
    {
        let name = name.into();
        validate_queue_name(&name)?;

        Ok(Self {
            name,
            handler: Arc::new(handler),
            options: QueueOptions::default(),
        })
    }

    /// Replace the consumer options (builder pattern)
    pub fn with_options(mut self, options: QueueOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    /// Run the handler for one message
    ///
    /// A panicking handler is reported as an error like any other failure.
    ///
    /// ```
    /// # use p2k16::queue::consumer::QueueRegistration;
    /// # use p2k16::queue::Message;
    /// # tokio_test::block_on(async {
    /// let registration = QueueRegistration::new("ldap-sync", |msg| Box::pin(async move {
    ///     if msg.entity_id < 0 {
    ///         return Err("unknown account".into());
    ///     }
    ///     Ok(())
    /// }))
    /// .unwrap();
    ///
    /// let message = Message {
    ///     id: 1,
    ///     created_at: chrono::Utc::now(),
    ///     processed_at: None,
    ///     queue: "ldap-sync".to_string(),
    ///     entity_id: -1,
    /// };
    /// assert!(registration.handle(message).await.is_err());
    /// # });
    /// ```
    pub async fn handle(&self, message: Message) -> std::result::Result<(), BoxError> {
        let handler = Arc::clone(&self.handler);
        let call = async move { handler(message).await };

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(format!("handler panicked: {}", panic_message(panic.as_ref())).into()),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for QueueRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueRegistration")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
