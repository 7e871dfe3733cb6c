// Handlers module

pub mod health;
pub mod ldap_sync;
pub mod queue_stats;

pub use health::health_handler;
pub use ldap_sync::ldap_sync_handler;
pub use queue_stats::queue_stats_handler;

use crate::models::ErrorResponse;
use crate::queue::Error;
use warp::http::StatusCode;

// Map a queue error to a JSON error reply
pub(crate) fn error_reply(err: &Error) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = match err {
        Error::ValidationError(_) => StatusCode::BAD_REQUEST,
        Error::NotFoundError(_) => StatusCode::NOT_FOUND,
        Error::ConnectionError(_) | Error::PoolError(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: err.to_string(),
        }),
        status,
    )
}
