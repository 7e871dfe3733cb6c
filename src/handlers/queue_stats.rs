// GET /queues/{name} handler

use crate::queue::QueueClient;
use std::convert::Infallible;
use tracing::warn;
use warp::Reply;

use super::error_reply;

pub async fn queue_stats_handler(
    queue: String,
    client: QueueClient,
) -> Result<warp::reply::Response, Infallible> {
    match client.queue_stats(&queue).await {
        Ok(stats) => Ok(warp::reply::json(&stats).into_response()),
        Err(e) => {
            warn!(queue = %queue, error = %e, "failed to read queue stats");
            Ok(error_reply(&e).into_response())
        }
    }
}
