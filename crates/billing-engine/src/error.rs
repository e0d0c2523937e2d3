//! # Engine Error Types
//!
//! One error enum for the whole service surface.
//!
//! ## Error Flow
//! ```text
//! ValidationError ──► CoreError ──┐
//!                                 ├──► EngineError
//! DbError ────────────────────────┘
//! ```
//!
//! Domain failures (validation, overpay, not found) pass through with
//! their messages intact; infrastructure failures collapse into
//! `StorageUnavailable` / `Storage` so callers never match on SQL details.
//!
//! A missing invoice and a hard-deleted one would report identically;
//! since rows are never hard-deleted, `NotFound` simply means the id was
//! never issued.

use thiserror::Error;

use billing_core::{CoreError, ValidationError};
use billing_db::DbError;

/// Errors surfaced by the engine services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain-rule failure from billing-core (validation, overpay,
    /// malformed input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The invoice is soft-deleted and no longer accepts edits.
    #[error("invoice {id} is deleted and cannot be modified")]
    InvalidState { id: String },

    /// A concurrent writer kept winning; the caller should retry.
    #[error("write conflict persisted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// The caller's role does not permit the operation.
    #[error("operation requires the admin role")]
    Unauthorized,

    /// The database could not be reached (connection or pool failure).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Any other database failure.
    #[error("storage error: {0}")]
    Storage(DbError),
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(msg) => EngineError::StorageUnavailable(msg),
            DbError::PoolExhausted => {
                EngineError::StorageUnavailable("connection pool exhausted".to_string())
            }
            other => EngineError::Storage(other),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::from(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err: EngineError = DbError::ConnectionFailed("refused".to_string()).into();
        assert!(matches!(err, EngineError::StorageUnavailable(_)));

        let err: EngineError = DbError::PoolExhausted.into();
        assert!(matches!(err, EngineError::StorageUnavailable(_)));

        let err: EngineError = DbError::Internal("boom".to_string()).into();
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[test]
    fn test_validation_error_wraps_as_core() {
        let err: EngineError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_not_found_message_does_not_leak_state() {
        let err = EngineError::NotFound {
            entity: "Invoice",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invoice not found: abc");
    }
}
