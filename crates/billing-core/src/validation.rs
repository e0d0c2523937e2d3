//! # Validation Module
//!
//! Field validators applied before business logic runs.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: Input coercion (input.rs)
//! ├── Key casing / numeric-as-string normalization
//! └── Unknown fields dropped
//!          │
//!          ▼
//! Layer 2: THIS MODULE - field and business-rule validation
//!          │
//!          ▼
//! Layer 3: Database (CHECK constraints, UNIQUE indexes, FKs)
//!
//! Defense in depth: each layer catches different errors.
//! ```
//!
//! Validation failures never partially mutate state; callers validate the
//! full change set before any write.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::quantize;
use crate::types::InvoiceLine;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

// =============================================================================
// Customer Fields
// =============================================================================

/// Validates a customer display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
///
/// Returns the trimmed name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an email address format.
///
/// A deliberately light check: one `@`, non-empty local part, and a dotted
/// domain. Deliverability is not this layer's concern.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "not a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() || email.contains(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(email.to_string())
}

/// Validates an address line (max 255 characters).
pub fn validate_address(address: &str) -> ValidationResult<String> {
    let address = address.trim();

    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: MAX_ADDRESS_LEN,
        });
    }

    Ok(address.to_string())
}

// =============================================================================
// Invoice Fields
// =============================================================================

/// Validates an invoice subtotal (required, never negative).
pub fn validate_subtotal(subtotal: Decimal) -> ValidationResult<Decimal> {
    if subtotal < Decimal::ZERO {
        return Err(ValidationError::MustBeNonNegative {
            field: "subtotal".to_string(),
        });
    }
    Ok(subtotal)
}

/// Validates a tax rate percentage (0-100 inclusive).
pub fn validate_tax_rate(rate: Decimal) -> ValidationResult<Decimal> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(rate)
}

/// Validates a requested paid amount against the invoice total.
///
/// Negative payments and overpay are both hard failures with the rejected
/// amount and current total in the message.
pub fn validate_paid_amount(paid: Decimal, total: Decimal) -> CoreResult<Decimal> {
    if paid < Decimal::ZERO {
        return Err(CoreError::NegativePayment { amount: paid });
    }
    if paid > total {
        return Err(CoreError::OverpayNotAllowed {
            attempted: paid,
            total,
        });
    }
    Ok(paid)
}

/// Parses a due date in `YYYY-MM-DD` form.
pub fn parse_due_date(raw: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| CoreError::MalformedDueDate {
        raw: raw.to_string(),
    })
}

// =============================================================================
// Line Items
// =============================================================================

/// Validates one line item and returns its quantized line total.
pub fn validate_line(description: &str, quantity: i64, unit_price: Decimal) -> ValidationResult<Decimal> {
    if description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "line.description".to_string(),
        });
    }
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "line.quantity".to_string(),
        });
    }
    if unit_price < Decimal::ZERO {
        return Err(ValidationError::MustBeNonNegative {
            field: "line.unit_price".to_string(),
        });
    }
    Ok(quantize(Decimal::from(quantity) * unit_price))
}

/// Checks that provided lines sum exactly to the provided subtotal.
pub fn validate_lines_total(lines: &[InvoiceLine], subtotal: Decimal) -> ValidationResult<()> {
    let lines_total: Decimal = lines.iter().map(|l| l.line_total).sum();
    if lines_total != subtotal {
        return Err(ValidationError::LineTotalsMismatch {
            lines_total,
            subtotal,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_customer_name() {
        assert_eq!(validate_customer_name("  Asha Rao ").unwrap(), "Asha Rao");
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email("a.b@sub.example.in").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("asha@").is_err());
        assert!(validate_email("asha@example").is_err());
        assert!(validate_email("asha rao@example.com").is_err());
    }

    #[test]
    fn test_subtotal_and_tax_rate_bounds() {
        assert!(validate_subtotal(dec("0")).is_ok());
        assert!(validate_subtotal(dec("-0.01")).is_err());
        assert!(validate_tax_rate(dec("18")).is_ok());
        assert!(validate_tax_rate(dec("0")).is_ok());
        assert!(validate_tax_rate(dec("100")).is_ok());
        assert!(validate_tax_rate(dec("100.5")).is_err());
        assert!(validate_tax_rate(dec("-1")).is_err());
    }

    #[test]
    fn test_paid_amount_bounds() {
        let total = dec("500.00");
        assert!(validate_paid_amount(dec("0"), total).is_ok());
        assert!(validate_paid_amount(dec("500.00"), total).is_ok());

        let err = validate_paid_amount(dec("500.01"), total).unwrap_err();
        assert!(matches!(err, CoreError::OverpayNotAllowed { .. }));

        let err = validate_paid_amount(dec("-1"), total).unwrap_err();
        assert!(matches!(err, CoreError::NegativePayment { .. }));
    }

    #[test]
    fn test_due_date_parsing() {
        assert_eq!(
            parse_due_date("2026-03-31").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
        );
        assert!(parse_due_date("31-03-2026").is_err());
        assert!(parse_due_date("2026-02-30").is_err());
        assert!(parse_due_date("soon").is_err());
    }

    #[test]
    fn test_line_validation() {
        assert_eq!(validate_line("Oil change", 2, dec("250.00")).unwrap(), dec("500.00"));
        assert!(validate_line("", 1, dec("10")).is_err());
        assert!(validate_line("Part", 0, dec("10")).is_err());
        assert!(validate_line("Part", 1, dec("-10")).is_err());
    }
}
