use std::net::SocketAddr;
use std::time::Duration;

use crate::queue::{consumer::QueueOptions, Error, QueueDbConfig, Result};

/// Host application configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection, from `DATABASE_URL`
    pub database: QueueDbConfig,

    /// HTTP listen address, from `HTTP_ADDR`
    pub http_addr: SocketAddr,

    /// Default log filter, from `LOG_LEVEL`
    pub log_level: String,

    /// Consumer options, from the `QUEUE_*` variables
    pub queue: QueueOptions,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| Error::ValidationError("DATABASE_URL is not set".to_string()))?;
        let database = QueueDbConfig::from_connection_string(&database_url)?;

        let http_addr = lookup("HTTP_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3030".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::ValidationError(format!("Invalid HTTP_ADDR: {}", e)))?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let mut queue = QueueOptions::default();
        if let Some(secs) = parse_var::<u64>(&lookup, "QUEUE_POLL_TIMEOUT_SECS")? {
            queue = queue.with_poll_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "QUEUE_RETRY_DELAY_MS")? {
            queue = queue.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(size) = parse_var::<i64>(&lookup, "QUEUE_BATCH_SIZE")? {
            if size < 1 {
                return Err(Error::ValidationError(
                    "QUEUE_BATCH_SIZE must be positive".to_string(),
                ));
            }
            queue = queue.with_batch_size(size);
        }

        Ok(Self {
            database,
            http_addr,
            log_level,
            queue,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::ValidationError(format!("Invalid {}: {}", key, value))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(
            "DATABASE_URL",
            "postgres://p2k16:secret@db:5432/p2k16",
        )]))
        .unwrap();

        assert_eq!(config.database.host, "db");
        assert_eq!(config.http_addr, "127.0.0.1:3030".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.queue, QueueOptions::default());
    }

    #[test]
    fn test_from_lookup_queue_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://p2k16:secret@db/p2k16"),
            ("HTTP_ADDR", "0.0.0.0:8080"),
            ("QUEUE_POLL_TIMEOUT_SECS", "30"),
            ("QUEUE_RETRY_DELAY_MS", "500"),
            ("QUEUE_BATCH_SIZE", "100"),
        ]))
        .unwrap();

        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.queue.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.queue.retry_delay, Duration::from_millis(500));
        assert_eq!(config.queue.batch_size, Some(100));
    }

    #[test]
    fn test_from_lookup_requires_database_url() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[])),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://p2k16:secret@db/p2k16"),
            ("QUEUE_BATCH_SIZE", "0"),
        ]));
        assert!(result.is_err());

        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://p2k16:secret@db/p2k16"),
            ("QUEUE_POLL_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
