// POST /accounts/{accountId}/ldap-sync handler

use crate::ldap::{self, LDAP_SYNC_QUEUE};
use crate::models::EnqueueResponse;
use crate::queue::{QueueClient, Result};
use std::convert::Infallible;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;

pub async fn ldap_sync_handler(
    account_id: i64,
    client: QueueClient,
) -> std::result::Result<warp::reply::Response, Infallible> {
    info!(account_id, "POST /accounts/{}/ldap-sync", account_id);

    match schedule_sync(&client, account_id).await {
        Ok(()) => {
            let response = EnqueueResponse {
                queue: LDAP_SYNC_QUEUE.to_string(),
                entity_id: account_id,
            };
            Ok(
                warp::reply::with_status(warp::reply::json(&response), StatusCode::ACCEPTED)
                    .into_response(),
            )
        }
        Err(e) => {
            warn!(account_id, error = %e, "failed to schedule directory sync");
            Ok(error_reply(&e).into_response())
        }
    }
}

async fn schedule_sync(client: &QueueClient, account_id: i64) -> Result<()> {
    let txn = client.begin_transaction().await?;
    ldap::sync_required(&txn, account_id).await?;
    txn.commit().await
}
