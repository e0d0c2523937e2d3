//! # Mobile Normalization
//!
//! Canonicalizes Indian mobile numbers to a 10-digit string.
//!
//! ## Normalization Steps
//! ```text
//! "+91 98765-43210"
//!      │  strip everything that is not a digit
//!      ▼
//! "919876543210"
//!      │  strip the country prefix when 12 digits start with 91
//!      ▼
//! "9876543210"
//!      │  require 10 digits, first digit 6-9
//!      ▼
//! canonical mobile
//! ```
//!
//! Duplicate detection keys on the canonical form, so "9876543210" and
//! "+91 98765 43210" collide as intended.

use crate::error::{CoreError, CoreResult};

/// Normalizes a raw mobile number to its canonical 10-digit form.
///
/// Strips whitespace, dashes, dots, parentheses, and an optional leading
/// `+91` or `91` country prefix. Fails with [`CoreError::InvalidMobile`]
/// when the remainder is not exactly 10 digits starting with 6-9.
///
/// ## Example
/// ```rust
/// use billing_core::mobile::normalize_mobile;
///
/// assert_eq!(normalize_mobile("+91 98765 43210").unwrap(), "9876543210");
/// assert_eq!(normalize_mobile("98765-43210").unwrap(), "9876543210");
/// assert!(normalize_mobile("12345").is_err());
/// ```
pub fn normalize_mobile(raw: &str) -> CoreResult<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 12 && digits.starts_with("91") {
        digits = digits.split_off(2);
    }

    if digits.len() != 10 {
        return Err(CoreError::InvalidMobile {
            reason: format!("expected 10 digits, got {}", digits.len()),
        });
    }

    // First digit 6-9 per Indian mobile numbering plan.
    let first = digits.as_bytes()[0];
    if !(b'6'..=b'9').contains(&first) {
        return Err(CoreError::InvalidMobile {
            reason: format!("first digit must be 6-9, got {}", first as char),
        });
    }

    Ok(digits)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ten_digits() {
        assert_eq!(normalize_mobile("9876543210").unwrap(), "9876543210");
    }

    #[test]
    fn test_strips_separators() {
        assert_eq!(normalize_mobile(" 98765 43210 ").unwrap(), "9876543210");
        assert_eq!(normalize_mobile("98765-43210").unwrap(), "9876543210");
        assert_eq!(normalize_mobile("(98765)43210").unwrap(), "9876543210");
        assert_eq!(normalize_mobile("98765.43210").unwrap(), "9876543210");
    }

    #[test]
    fn test_strips_country_prefix() {
        assert_eq!(normalize_mobile("+919876543210").unwrap(), "9876543210");
        assert_eq!(normalize_mobile("919876543210").unwrap(), "9876543210");
        assert_eq!(normalize_mobile("+91 98765 43210").unwrap(), "9876543210");
    }

    /// A 10-digit number that happens to start with 91 is not a prefix.
    #[test]
    fn test_ten_digits_starting_91_kept_whole() {
        assert_eq!(normalize_mobile("9123456789").unwrap(), "9123456789");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(normalize_mobile("12345").is_err());
        assert!(normalize_mobile("98765432101").is_err());
        assert!(normalize_mobile("").is_err());
    }

    #[test]
    fn test_rejects_bad_first_digit() {
        let err = normalize_mobile("1234567890").unwrap_err();
        assert!(matches!(err, CoreError::InvalidMobile { .. }));
        assert!(normalize_mobile("5876543210").is_err());
        assert!(normalize_mobile("6876543210").is_ok());
    }
}
