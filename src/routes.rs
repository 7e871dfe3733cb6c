// Route definitions and handlers

use crate::handlers;
use crate::queue::QueueClient;
use warp::Filter;

pub fn configure_routes(
    client: QueueClient,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));
    let with_client = warp::any().map(move || client.clone());

    // POST /accounts/{accountId}/ldap-sync
    let ldap_sync = api
        .and(warp::path("accounts"))
        .and(warp::path::param::<i64>())
        .and(warp::path("ldap-sync"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_client.clone())
        .and_then(handlers::ldap_sync_handler);

    // GET /queues/{name}
    let queue_stats = api
        .and(warp::path("queues"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_client)
        .and_then(handlers::queue_stats_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_handler);

    // Combine routes
    ldap_sync.or(queue_stats).or(health)
}
