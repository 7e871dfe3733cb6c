use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A queued unit of work read from the message table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonic identifier, also sent as the notification payload
    pub id: i64,

    /// UTC timestamp when the message was enqueued
    pub created_at: DateTime<Utc>,

    /// UTC timestamp when a handler completed, None while pending
    pub processed_at: Option<DateTime<Utc>>,

    /// Queue (and notification channel) name
    pub queue: String,

    /// Opaque reference to the domain object the side effect concerns
    pub entity_id: i64,
}

impl Message {
    /// Build a message from a row selecting the message table columns
    pub(crate) fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            created_at: row.get("created_at"),
            processed_at: row.get("processed_at"),
            queue: row.get("queue"),
            entity_id: row.get("entity_id"),
        }
    }

    /// True while no handler has completed for this message
    pub fn is_pending(&self) -> bool {
        self.processed_at.is_none()
    }
}

/// Summary counts for one queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queue: String,
    pub pending: i64,
    pub processed: i64,
    pub oldest_pending_at: Option<DateTime<Utc>>,
}
