//! Durable storage for queue messages.
//!
//! The table is an append log used as a work list: rows are inserted by the
//! producer, flagged once through `processed_at`, and never deleted here.

use tokio_postgres::Client;
use tracing::info;

use crate::queue::error::Result;
use crate::queue::utils::quote_identifier;

/// DDL for the message table and its pending-work index
pub fn create_statements(schema_name: &str) -> String {
    let schema = quote_identifier(schema_name);
    format!(
        "CREATE SCHEMA IF NOT EXISTS {schema};
         CREATE TABLE IF NOT EXISTS {schema}.q_message (
             id           BIGSERIAL PRIMARY KEY,
             created_at   TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
             processed_at TIMESTAMPTZ NULL,
             queue        VARCHAR(63) NOT NULL,
             entity_id    BIGINT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS q_message_pending_idx
             ON {schema}.q_message (queue, id)
             WHERE processed_at IS NULL;"
    )
}

/// Create the message table if it does not exist yet
pub async fn ensure_schema(client: &Client, schema_name: &str) -> Result<()> {
    client.batch_execute(&create_statements(schema_name)).await?;
    info!(schema = schema_name, "message table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_statements_use_schema() {
        let sql = create_statements("membership");
        assert!(sql.contains("CREATE SCHEMA IF NOT EXISTS \"membership\""));
        assert!(sql.contains("\"membership\".q_message"));
        assert!(sql.contains("processed_at TIMESTAMPTZ NULL"));
        assert!(sql.contains("WHERE processed_at IS NULL"));
    }
}
