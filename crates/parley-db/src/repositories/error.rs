//! Error handling utilities for repositories

use parley_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert a SQLx error to a DomainError.
///
/// Pool timeouts and connection failures become the retryable
/// store-unavailable variant; everything else is a plain store error.
pub fn map_db_error(e: SqlxError) -> DomainError {
    match &e {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
            DomainError::StoreUnavailable(e.to_string())
        }
        _ => DomainError::Store(e.to_string()),
    }
}

/// Check for unique violation and return the supplied error, or fall back
/// to the standard mapping
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}
