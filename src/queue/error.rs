use thiserror::Error;

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by message handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for queue operations
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error - invalid queue name or configuration
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Connection error - database unreachable, listener connection lost
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Not found error - message doesn't exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Database error - SQL errors, constraint violations
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Pool error - connection pool issues
    #[error("Pool error: {0}")]
    PoolError(String),

    /// Transaction error - transaction already completed or failed to finish
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// A registered handler failed for a message
    #[error("Handler for queue '{queue}' failed on message {message_id}: {source}")]
    HandlerError {
        queue: String,
        message_id: i64,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// True for failures that originate from the database connection itself
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::ConnectionError(_) | Error::PoolError(_))
    }
}

/// Convert tokio-postgres errors to queue errors
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            return Error::DatabaseError(format!(
                "{}: {}",
                db_error.code().code(),
                db_error.message()
            ));
        }

        // A closed connection is reported without a server-side error
        if err.is_closed() {
            return Error::ConnectionError(err.to_string());
        }

        Error::DatabaseError(format!("{:?}", err))
    }
}

/// Convert deadpool errors to queue errors
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Error::PoolError(err.to_string())
    }
}

/// Convert deadpool build errors to queue errors
impl From<deadpool_postgres::BuildError> for Error {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Error::ConnectionError(err.to_string())
    }
}
