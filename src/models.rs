// Response bodies for the HTTP API

use serde::{Deserialize, Serialize};

// POST /accounts/{id}/ldap-sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnqueueResponse {
    pub queue: String,
    pub entity_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}
