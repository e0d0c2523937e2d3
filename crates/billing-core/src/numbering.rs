//! # Invoice Number Formatting
//!
//! Pure formatting half of the numbering allocator: the storage layer
//! hands out a collision-free per-day sequence (atomic counter row); this
//! module turns `(date, sequence)` into the human invoice number.

use chrono::NaiveDate;

/// Formats an invoice number as `INV-{YYYYMMDD}-{NNNN}`.
///
/// `sequence` is the per-day counter value, 1-based; `(date, sequence)` is
/// the uniqueness scope, so numbers are never reused even after soft
/// deletion.
///
/// ## Example
/// ```rust
/// use billing_core::numbering::format_invoice_number;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
/// assert_eq!(format_invoice_number(date, 7), "INV-20260830-0007");
/// ```
pub fn format_invoice_number(date: NaiveDate, sequence: i64) -> String {
    format!("INV-{}-{:04}", date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_four_digits() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_invoice_number(date, 1), "INV-20260105-0001");
        assert_eq!(format_invoice_number(date, 42), "INV-20260105-0042");
        assert_eq!(format_invoice_number(date, 9999), "INV-20260105-9999");
    }

    #[test]
    fn test_format_survives_daily_overflow() {
        // Past 9999 the number widens rather than wrapping; uniqueness holds.
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_invoice_number(date, 10000), "INV-20260105-10000");
    }
}
