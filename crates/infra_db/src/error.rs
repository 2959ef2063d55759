//! Database error types
//!
//! Maps SQLx failures onto meaningful variants, keyed off the PostgreSQL
//! error codes where available, and translates them into the domain's
//! transport-level `StoreError` so the engine can tell retryable faults
//! from real failures.

use domain_billing::StoreError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Deadlock or serialization failure; the transaction may be retried
    #[error("Transaction aborted: {0}")]
    SerializationFailure(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Checks if retrying the transaction may succeed
    pub fn is_retryable(&self) -> bool {
        self.is_connection_error() || matches!(self, DatabaseError::SerializationFailure(_))
    }
}

/// Converts SQLx errors to specific DatabaseError variants based on the
/// PostgreSQL error code.
///
/// Error codes: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                        "23503" => {
                            DatabaseError::ForeignKeyViolation(db_err.message().to_string())
                        }
                        "23514" => {
                            DatabaseError::ConstraintViolation(db_err.message().to_string())
                        }
                        // serialization_failure / deadlock_detected
                        "40001" | "40P01" => {
                            DatabaseError::SerializationFailure(db_err.message().to_string())
                        }
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match &error {
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => {
                StoreError::Unavailable(error.to_string())
            }
            DatabaseError::SerializationFailure(_) => StoreError::Serialization(error.to_string()),
            _ => StoreError::Internal(error.to_string()),
        }
    }
}

/// Shortcut used by the repositories: sqlx -> DatabaseError -> StoreError.
pub(crate) fn store_err(error: sqlx::Error) -> StoreError {
    StoreError::from(DatabaseError::from(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_retryable() {
        assert!(DatabaseError::PoolExhausted.is_retryable());
        assert!(DatabaseError::ConnectionFailed("refused".into()).is_retryable());
        assert!(DatabaseError::SerializationFailure("deadlock".into()).is_retryable());
        assert!(!DatabaseError::DuplicateEntry("pkey".into()).is_retryable());
    }

    #[test]
    fn test_store_error_mapping_preserves_transience() {
        let transient: StoreError = DatabaseError::PoolExhausted.into();
        assert!(transient.is_transient());

        let serialization: StoreError =
            DatabaseError::SerializationFailure("40001".into()).into();
        assert!(serialization.is_transient());

        let terminal: StoreError = DatabaseError::QueryFailed("syntax".into()).into();
        assert!(!terminal.is_transient());
    }
}
