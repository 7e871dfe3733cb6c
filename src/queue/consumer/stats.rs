use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Snapshot of a consumer's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Listener connections opened, including the first one
    pub connections: u64,

    /// Times the supervisor restarted the listener after a failure
    pub restarts: u64,

    /// Batches that committed
    pub batches: u64,

    /// Messages marked processed
    pub messages_processed: u64,

    /// Handler calls that returned an error
    pub handler_failures: u64,

    /// Most recent failure seen by the supervisor
    pub last_error: Option<String>,
}

/// Live counters shared between a consumer task and its handle
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    connections: AtomicU64,
    restarts: AtomicU64,
    batches: AtomicU64,
    messages_processed: AtomicU64,
    handler_failures: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl StatsCounters {
    pub(crate) fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_restart(&self, error: &str) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last_error) = self.last_error.lock() {
            *last_error = Some(error.to_string());
        }
    }

    pub(crate) fn record_batch(&self, processed: usize, failed: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.messages_processed
            .fetch_add(processed as u64, Ordering::Relaxed);
        self.handler_failures
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ConsumerStats {
        ConsumerStats {
            connections: self.connections.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .map(|last_error| last_error.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = StatsCounters::default();
        counters.record_connection();
        counters.record_connection();
        counters.record_batch(3, 1);
        counters.record_handler_failure();
        counters.record_restart("listener connection closed");

        let stats = counters.snapshot();
        assert_eq!(stats.connections, 2);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.messages_processed, 3);
        assert_eq!(stats.handler_failures, 2);
        assert_eq!(stats.restarts, 1);
        assert_eq!(stats.last_error.as_deref(), Some("listener connection closed"));
    }
}
