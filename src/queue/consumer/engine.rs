//! Claim-and-process: the only place a message moves from pending to done.
//!
//! One batch is one transaction. Candidate rows are locked with
//! `FOR UPDATE SKIP LOCKED`, each is handed to the registration's handler, and
//! handled rows get `processed_at` set. Nothing is visible to other consumers
//! until the commit; a consumer that dies mid-batch loses its connection and
//! with it every lock, so the rows become claimable again.

use deadpool_postgres::Pool;
use tracing::{debug, warn};

use crate::queue::{
    consumer::registration::{FailurePolicy, QueueRegistration},
    error::{Error, Result},
    operations::{claim_messages, mark_processed, ClaimRequest},
    transaction::Transaction,
};

/// Result of one committed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows locked by this batch
    pub claimed: usize,

    /// Ids marked processed, in handling order
    pub processed: Vec<i64>,

    /// Ids whose handler failed and that stay pending (`FailurePolicy::Isolate` only)
    pub failed: Vec<i64>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.claimed == 0
    }
}

/// Claim pending messages of a registration's queue and run its handler on each.
///
/// With [`FailurePolicy::AbortBatch`] the first handler error rolls back the
/// whole batch and is returned; none of the claimed rows are marked. With
/// [`FailurePolicy::Isolate`] the failed message is left pending and the
/// rest of the batch still commits.
pub async fn process_batch(
    pool: &Pool,
    table: &str,
    registration: &QueueRegistration,
    request: &ClaimRequest,
) -> Result<BatchOutcome> {
    if request.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let queue = registration.name();
    let request = ClaimRequest {
        candidates: request.candidates.clone(),
        limit: request.limit.or(registration.options().batch_size),
    };

    let connection = pool.get().await?;
    let txn = Transaction::begin(connection, table.to_string()).await?;

    let messages = claim_messages(txn.client()?, table, queue, &request).await?;
    let mut outcome = BatchOutcome {
        claimed: messages.len(),
        ..Default::default()
    };

    if messages.is_empty() {
        txn.commit().await?;
        return Ok(outcome);
    }

    debug!(queue, claimed = outcome.claimed, "claimed messages");

    for message in messages {
        let id = message.id;
        let entity_id = message.entity_id;

        match registration.handle(message).await {
            Ok(()) => {
                mark_processed(txn.client()?, table, id).await?;
                outcome.processed.push(id);
            }
            Err(source) => match registration.options().failure_policy {
                FailurePolicy::AbortBatch => {
                    if let Err(e) = txn.rollback().await {
                        warn!(queue, error = %e, "Exception while rolling back batch");
                    }
                    return Err(Error::HandlerError {
                        queue: queue.to_string(),
                        message_id: id,
                        source,
                    });
                }
                FailurePolicy::Isolate => {
                    warn!(queue, message_id = id, entity_id, error = %source, "handler failed, message left pending");
                    outcome.failed.push(id);
                }
            },
        }
    }

    txn.commit().await?;
    debug!(
        queue,
        processed = outcome.processed.len(),
        failed = outcome.failed.len(),
        "batch committed"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_empty() {
        assert!(BatchOutcome::default().is_empty());
        let outcome = BatchOutcome {
            claimed: 2,
            processed: vec![1],
            failed: vec![2],
        };
        assert!(!outcome.is_empty());
    }
}
