use tokio_postgres::Client;

use crate::queue::error::Result;

/// Insert a pending message and notify the queue's channel
///
/// # Arguments
///
/// * `client` - Connection with an open transaction owned by the caller
/// * `table` - Qualified message table name
/// * `queue` - Queue name, also the notification channel
/// * `entity_id` - Reference to the domain object the side effect concerns
///
/// # Returns
///
/// Returns the id assigned to the new message
///
/// # Behavior
///
/// 1. **No transaction control**: nothing is begun or committed here
/// 2. **Transactional notify**: `pg_notify` is queued with the transaction, so
///    listeners only see the id after the caller commits, and never after a rollback
/// 3. **Payload**: the notification carries the message id as a decimal string
pub async fn insert_message(
    client: &Client,
    table: &str,
    queue: &str,
    entity_id: i64,
) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {} (created_at, queue, entity_id) \
         VALUES (CURRENT_TIMESTAMP, $1, $2) \
         RETURNING id",
        table
    );

    let row = client.query_one(&sql, &[&queue, &entity_id]).await?;
    let id: i64 = row.get(0);

    client
        .execute("SELECT pg_notify($1, $2)", &[&queue, &id.to_string()])
        .await?;

    Ok(id)
}
