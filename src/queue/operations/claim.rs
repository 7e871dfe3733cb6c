use tokio_postgres::Client;

use crate::queue::{error::Result, types::Message};

/// Which pending rows a claim may take
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimRequest {
    /// Candidate message ids; None claims any pending row of the queue
    pub candidates: Option<Vec<i64>>,

    /// Maximum rows to claim; None claims every match
    pub limit: Option<i64>,
}

impl ClaimRequest {
    /// Claim only the given ids (typically notification payloads)
    pub fn ids(candidates: impl IntoIterator<Item = i64>) -> Self {
        Self {
            candidates: Some(candidates.into_iter().collect()),
            limit: None,
        }
    }

    /// Claim any pending row of the queue
    pub fn pending() -> Self {
        Self::default()
    }

    /// Set the maximum number of rows (builder pattern)
    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// True when an explicit candidate list is present but empty
    pub fn is_empty(&self) -> bool {
        matches!(&self.candidates, Some(ids) if ids.is_empty())
    }
}

/// Lock pending rows of a queue for the current transaction
///
/// Rows locked by another transaction are skipped rather than waited on, so
/// concurrent claimers never block each other and never both receive a row.
/// Must run inside a transaction; the locks last until it ends.
pub async fn claim_messages(
    client: &Client,
    table: &str,
    queue: &str,
    request: &ClaimRequest,
) -> Result<Vec<Message>> {
    let sql = format!(
        "SELECT id, created_at, processed_at, queue, entity_id \
         FROM {} \
         WHERE processed_at IS NULL \
           AND queue = $1 \
           AND ($2::BIGINT[] IS NULL OR id = ANY($2)) \
         ORDER BY id \
         LIMIT $3 \
         FOR UPDATE SKIP LOCKED",
        table
    );

    let rows = client
        .query(&sql, &[&queue, &request.candidates, &request.limit])
        .await?;

    Ok(rows.iter().map(Message::from_row).collect())
}

/// Mark a claimed message as processed
pub async fn mark_processed(client: &Client, table: &str, id: i64) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET processed_at = CURRENT_TIMESTAMP WHERE id = $1",
        table
    );
    client.execute(&sql, &[&id]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_request_ids() {
        let request = ClaimRequest::ids(vec![3, 1, 2]).with_limit(Some(10));
        assert_eq!(request.candidates, Some(vec![3, 1, 2]));
        assert_eq!(request.limit, Some(10));
        assert!(!request.is_empty());
    }

    #[test]
    fn test_claim_request_empty() {
        assert!(ClaimRequest::ids(Vec::new()).is_empty());
        assert!(!ClaimRequest::pending().is_empty());
    }
}
