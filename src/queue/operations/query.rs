use tokio_postgres::Client;

use crate::queue::{
    error::Result,
    types::{Message, QueueStats},
};

/// Retrieve a single message by id
///
/// Returns None if no message has that id.
pub async fn get_message(client: &Client, table: &str, id: i64) -> Result<Option<Message>> {
    let sql = format!(
        "SELECT id, created_at, processed_at, queue, entity_id FROM {} WHERE id = $1",
        table
    );

    let row = client.query_opt(&sql, &[&id]).await?;
    Ok(row.as_ref().map(Message::from_row))
}

/// Retrieve pending messages of a queue, oldest first, without locking them
pub async fn pending_messages(
    client: &Client,
    table: &str,
    queue: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>> {
    let sql = format!(
        "SELECT id, created_at, processed_at, queue, entity_id \
         FROM {} \
         WHERE processed_at IS NULL AND queue = $1 \
         ORDER BY id \
         LIMIT $2",
        table
    );

    let rows = client.query(&sql, &[&queue, &limit]).await?;
    Ok(rows.iter().map(Message::from_row).collect())
}

/// Count pending and processed messages of a queue
pub async fn queue_stats(client: &Client, table: &str, queue: &str) -> Result<QueueStats> {
    let sql = format!(
        "SELECT \
             COUNT(*) FILTER (WHERE processed_at IS NULL) AS pending, \
             COUNT(*) FILTER (WHERE processed_at IS NOT NULL) AS processed, \
             MIN(created_at) FILTER (WHERE processed_at IS NULL) AS oldest_pending_at \
         FROM {} \
         WHERE queue = $1",
        table
    );

    let row = client.query_one(&sql, &[&queue]).await?;

    Ok(QueueStats {
        queue: queue.to_string(),
        pending: row.get("pending"),
        processed: row.get("processed"),
        oldest_pending_at: row.get("oldest_pending_at"),
    })
}
