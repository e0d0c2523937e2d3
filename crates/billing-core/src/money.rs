//! # Money Module
//!
//! Deterministic decimal arithmetic for all tax and total computations.
//!
//! ## Why Decimal?
//! ```text
//! In binary floating point:
//!   0.1 + 0.2 = 0.30000000000000004   WRONG for money
//!
//! With rust_decimal:
//!   0.1 + 0.2 = 0.3 exactly
//!
//! Subtotals may legitimately carry sub-cent precision (e.g. 33.335 from a
//! rate card); derived fields are rounded to 2 places exactly once.
//! ```
//!
//! ## Rounding Contract
//! HALF_UP (midpoint away from zero): a value ending in exactly .005 rounds
//! up to .01, never to even. Every derived field (tax, total, outstanding)
//! is quantized once, from the canonical subtotal/rate/paid inputs, never
//! by adjusting a previously rounded value, so repeated edits cannot drift.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;

/// Rounds a decimal to 2 places using HALF_UP semantics.
///
/// ## Example
/// ```rust
/// use billing_core::money::quantize;
/// use std::str::FromStr;
/// use rust_decimal::Decimal;
///
/// let v = Decimal::from_str("6.005").unwrap();
/// assert_eq!(quantize(v), Decimal::from_str("6.01").unwrap());
/// ```
#[inline]
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the tax amount from the canonical subtotal and rate.
///
/// `tax = quantize(subtotal * rate / 100)`
#[inline]
pub fn tax_amount(subtotal: Decimal, tax_rate: Decimal) -> Decimal {
    quantize(subtotal * tax_rate / Decimal::ONE_HUNDRED)
}

/// Computes the invoice total from the canonical subtotal and tax amount.
#[inline]
pub fn total_amount(subtotal: Decimal, tax: Decimal) -> Decimal {
    quantize(subtotal + tax)
}

/// Computes the outstanding amount, floored at zero.
#[inline]
pub fn outstanding(total: Decimal, paid: Decimal) -> Decimal {
    let diff = quantize(total - paid);
    if diff < Decimal::ZERO {
        Decimal::ZERO
    } else {
        diff
    }
}

/// Tax and total derived together from the same canonical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Derives tax and total for an invoice in one pass.
///
/// This is the only place invoice amounts are computed; create and every
/// recomputing edit go through it so the rounding behaviour is identical.
pub fn compute_amounts(subtotal: Decimal, tax_rate: Decimal) -> Amounts {
    let tax = tax_amount(subtotal, tax_rate);
    Amounts {
        tax_amount: tax,
        total_amount: total_amount(subtotal, tax),
    }
}

/// Parses a monetary amount from its canonical string form.
///
/// Floating-point intermediaries are never used; the string is parsed
/// directly into an exact decimal.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ValidationError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{raw}' is not a decimal amount"),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
