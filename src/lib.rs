// HTTP host modules
pub mod config;
pub mod handlers;
pub mod ldap;
pub mod logging;
pub mod models;
pub mod routes;

// Durable job queue
pub mod queue;
