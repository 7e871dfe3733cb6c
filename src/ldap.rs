//! Directory synchronisation seam.
//!
//! Account mutations call [`sync_required`] inside their transaction; the
//! `ldap-sync` consumer later picks the account up. Talking to the directory
//! server is outside this crate, the handler records what it would update.

use tracing::info;

use crate::queue::{
    consumer::{HandlerFuture, QueueOptions, QueueRegistration},
    Message, Result, Transaction,
};

/// Queue carrying accounts whose directory entry is stale
pub const LDAP_SYNC_QUEUE: &str = "ldap-sync";

/// Schedule a directory update for `account_id` as part of `txn`
pub async fn sync_required(txn: &Transaction, account_id: i64) -> Result<()> {
    txn.enqueue(LDAP_SYNC_QUEUE, account_id).await
}

/// Handler for `ldap-sync` messages
pub fn on_ldap_sync(message: Message) -> HandlerFuture {
    Box::pin(async move {
        info!(
            message_id = message.id,
            account_id = message.entity_id,
            "Updating Account record"
        );
        Ok(())
    })
}

/// Registration for the `ldap-sync` consumer
pub fn registration(options: QueueOptions) -> Result<QueueRegistration> {
    Ok(QueueRegistration::new(LDAP_SYNC_QUEUE, on_ldap_sync)?.with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_registration_uses_queue_name() {
        let registration = registration(QueueOptions::default().with_batch_size(10)).unwrap();
        assert_eq!(registration.name(), "ldap-sync");
        assert_eq!(registration.options().batch_size, Some(10));
    }

    #[tokio::test]
    async fn test_on_ldap_sync_succeeds() {
        let message = Message {
            id: 3,
            created_at: Utc::now(),
            processed_at: None,
            queue: LDAP_SYNC_QUEUE.to_string(),
            entity_id: 1001,
        };
        assert!(on_ldap_sync(message).await.is_ok());
    }
}
