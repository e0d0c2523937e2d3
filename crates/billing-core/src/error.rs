//! # Error Types
//!
//! Domain-specific error types for billing-core.
//!
//! ## Error Hierarchy
//! ```text
//! billing-core errors (this file)
//! ├── CoreError        - Business rule violations (overpay, bad mobile, ...)
//! └── ValidationError  - Field-level input validation failures
//!
//! billing-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! billing-engine errors (separate crate)
//! └── EngineError      - What the transport collaborator sees
//!
//! Flow: ValidationError → CoreError → EngineError → caller
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, amount, total)
//! 3. Errors are enum variants, never String

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule errors.
///
/// Each variant maps one-to-one onto a failure kind the external API layer
/// reports to its caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Mobile number did not normalize to a valid 10-digit Indian mobile.
    ///
    /// ## When This Occurs
    /// - Fewer or more than 10 digits after stripping separators and the
    ///   optional `+91`/`91` prefix
    /// - First digit outside 6-9
    #[error("invalid mobile number: {reason}")]
    InvalidMobile { reason: String },

    /// Customer has neither a mobile number nor an email address.
    #[error("at least one of mobile or email is required")]
    MissingContactMethod,

    /// Due date string does not parse as a calendar date.
    #[error("due date '{raw}' is not a valid calendar date (expected YYYY-MM-DD)")]
    MalformedDueDate { raw: String },

    /// Payment would push paid_amount above total_amount.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice total: 500.00, attempt paid_amount = 500.01
    ///      │
    ///      ▼
    /// OverpayNotAllowed { attempted: 500.01, total: 500.00 }
    ///      │
    ///      ▼
    /// UI shows: "paid amount 500.01 exceeds total 500.00"
    /// ```
    #[error("paid amount {attempted} exceeds invoice total {total}")]
    OverpayNotAllowed { attempted: Decimal, total: Decimal },

    /// Payment amount is negative.
    #[error("paid amount {amount} is negative")]
    NegativePayment { amount: Decimal },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before business logic runs; messages always name the field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Monetary or numeric value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad email, non-numeric amount, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Provided line items do not sum to the provided subtotal.
    #[error("line totals sum to {lines_total} but subtotal is {subtotal}")]
    LineTotalsMismatch {
        lines_total: Decimal,
        subtotal: Decimal,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_error_messages_carry_context() {
        let err = CoreError::OverpayNotAllowed {
            attempted: Decimal::from_str("500.01").unwrap(),
            total: Decimal::from_str("500.00").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "paid amount 500.01 exceeds invoice total 500.00"
        );
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::Required {
            field: "subtotal".to_string(),
        };
        assert_eq!(err.to_string(), "subtotal is required");

        let err = ValidationError::TooLong {
            field: "address".to_string(),
            max: 255,
        };
        assert_eq!(err.to_string(), "address must be at most 255 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
