//! # Domain Types
//!
//! Core domain types for the billing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────┐   ┌─────────────────┐   ┌────────────────────┐
//! │    Customer     │   │     Invoice     │   │  BusinessSettings  │
//! │  ─────────────  │   │  ─────────────  │   │  ────────────────  │
//! │  id (UUID)      │   │  id (UUID)      │   │  default_tax_rate  │
//! │  mobile (norm.) │   │  invoice_number │   │  business_name     │
//! │  status         │   │  payment_status │   │  branding_ref      │
//! └─────────────────┘   │  snapshot (JSON)│   └────────────────────┘
//!                       └─────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Invoices carry two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `invoice_number`: human-facing `INV-YYYYMMDD-NNNN`, unique, never reused
//!
//! ## Snapshot Pattern
//! The tax rate and branding in effect at issue time are frozen into the
//! invoice as a [`SettingsSnapshot`]. Later settings changes never alter an
//! issued invoice; historical documents stay reproducible.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

// =============================================================================
// Customer
// =============================================================================

/// Whether a customer participates in lookups and duplicate detection.
///
/// Customers are never hard-deleted; deactivation removes them from the
/// active set without losing invoice history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

/// A customer of the service center.
///
/// ## Invariants
/// - At least one of `mobile` / `email` is present.
/// - `mobile`, when present, is already normalized: exactly 10 digits with
///   first digit 6-9 (see [`crate::mobile::normalize_mobile`]).
///
/// There is deliberately no uniqueness constraint on `mobile`: duplicates
/// are permitted and surfaced as a warning at read time, never blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on invoices.
    pub name: String,

    /// Normalized 10-digit mobile number, if provided.
    pub mobile: Option<String>,

    /// Email address, if provided.
    pub email: Option<String>,

    /// Address line (max 255 characters).
    pub address: Option<String>,

    /// City, if provided.
    pub city: Option<String>,

    /// Active customers participate in lookups and duplicate detection.
    pub status: CustomerStatus,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,

    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Checks whether the customer is in the active set.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Derived payment state of an invoice.
///
/// Never set directly: always re-derived from `paid_amount` vs
/// `total_amount` via [`PaymentStatus::derive`], so it can never fall out
/// of sync with the amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet (`paid_amount == 0`).
    Pending,
    /// Partially paid (`0 < paid_amount < total_amount`).
    Partial,
    /// Fully paid (`paid_amount == total_amount`).
    Paid,
}

impl PaymentStatus {
    /// Derives the status from the canonical amounts.
    ///
    /// Overpay is rejected before this runs, so `paid > total` is
    /// unreachable in persisted state; `>=` guards the comparison anyway.
    pub fn derive(paid_amount: Decimal, total_amount: Decimal) -> Self {
        if paid_amount.is_zero() {
            PaymentStatus::Pending
        } else if paid_amount >= total_amount {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

// =============================================================================
// Lifecycle Status
// =============================================================================

/// Business lifecycle label, orthogonal to soft deletion.
///
/// Cancellation is reversible business semantics and a pure label: it does
/// not gate edits or payments and does not affect listing. Soft deletion is
/// a separate near-terminal visibility flag (`Invoice::is_deleted`); the
/// two must never share filtering logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Active,
    Cancelled,
}

// =============================================================================
// Invoice
// =============================================================================

/// An issued invoice.
///
/// ## Amount Invariants
/// - `tax_amount = quantize(subtotal * tax_rate / 100)`
/// - `total_amount = quantize(subtotal + tax_amount)`
/// - `0 <= paid_amount <= total_amount`
/// - `payment_status` always matches the derive rule for the stored amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human invoice number, `INV-YYYYMMDD-NNNN`. Unique, never reused.
    pub invoice_number: String,

    /// Customer this invoice bills.
    pub customer_id: String,

    /// Service description / notes.
    pub description: Option<String>,

    /// Terms and conditions text printed on the document.
    pub terms_and_conditions: Option<String>,

    /// Pre-tax amount. May carry more than 2 decimal places.
    pub subtotal: Decimal,

    /// Tax rate as a percentage, snapshotted at creation or last edit.
    pub tax_rate: Decimal,

    /// Derived: `quantize(subtotal * tax_rate / 100)`.
    pub tax_amount: Decimal,

    /// Derived: `quantize(subtotal + tax_amount)`.
    pub total_amount: Decimal,

    /// Amount paid so far. Never negative, never above `total_amount`.
    pub paid_amount: Decimal,

    /// Derived payment state.
    pub payment_status: PaymentStatus,

    /// Cancellation label (informational only).
    pub lifecycle_status: LifecycleStatus,

    /// Soft-delete flag. Deleted invoices leave active listings but stay
    /// individually retrievable.
    pub is_deleted: bool,

    /// When the invoice was soft-deleted, if it was.
    pub deleted_at: Option<DateTime<Utc>>,

    /// Payment due date, if agreed.
    pub due_date: Option<NaiveDate>,

    /// Settings frozen at issue time (tax rate default, branding).
    pub settings_snapshot: SettingsSnapshot,

    /// Optional line items decomposing the subtotal.
    pub lines: Vec<InvoiceLine>,

    /// When the invoice was created. Immutable.
    pub created_at: DateTime<Utc>,

    /// When the invoice was last mutated (including soft delete).
    pub updated_at: DateTime<Utc>,

    /// Optimistic-concurrency revision, bumped on every mutation.
    pub revision: i64,
}

impl Invoice {
    /// Derived outstanding amount, floored at zero.
    #[inline]
    pub fn outstanding_amount(&self) -> Decimal {
        money::outstanding(self.total_amount, self.paid_amount)
    }

    /// Checks whether the due date has passed without full payment.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => today > due && self.payment_status != PaymentStatus::Paid,
            None => false,
        }
    }
}

// =============================================================================
// Invoice Line
// =============================================================================

/// Optional decomposition of an invoice subtotal.
///
/// When lines are present their totals sum exactly to the subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Invoice this line belongs to.
    pub invoice_id: String,

    /// What was billed.
    pub description: String,

    /// Quantity billed. Always > 0.
    pub quantity: i64,

    /// Price per unit. Never negative.
    pub unit_price: Decimal,

    /// `quantize(quantity * unit_price)`.
    pub line_total: Decimal,
}

// =============================================================================
// Settings
// =============================================================================

/// The live, mutable configuration record (singleton).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// Default GST rate (percentage) applied when an invoice omits one.
    pub default_tax_rate: Decimal,

    /// Business name printed on invoices.
    pub business_name: String,

    /// Business address printed on invoices.
    pub business_address: String,

    /// Opaque reference to branding assets (logo path, theme key, ...).
    pub branding_ref: Option<String>,

    /// When the settings were last changed.
    pub updated_at: DateTime<Utc>,
}

impl BusinessSettings {
    /// Freezes the current defaults into an invoice-embedded snapshot.
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            tax_rate: self.default_tax_rate,
            business_name: self.business_name.clone(),
            business_address: self.business_address.clone(),
            branding_ref: self.branding_ref.clone(),
        }
    }
}

/// Frozen copy of settings embedded into each invoice at issue time.
///
/// Never recomputed retroactively: this is what keeps historical documents
/// reproducible after configuration changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Default tax rate in effect when the invoice was issued.
    pub tax_rate: Decimal,
    pub business_name: String,
    pub business_address: String,
    pub branding_ref: Option<String>,
}

// =============================================================================
// Download Audit
// =============================================================================

/// How an invoice document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DownloadAction {
    Print,
    Pdf,
}

/// One append-only record of an invoice render/download event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadAuditEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Invoice that was rendered.
    pub invoice_id: String,

    /// Acting user, when known.
    pub actor_id: Option<String>,

    /// What was produced.
    pub action: DownloadAction,

    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Actors
// =============================================================================

/// Caller role. The only split the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
}

/// The caller on whose behalf an operation runs.
///
/// Authentication itself is an external collaborator; the engine only
/// consumes the resolved identity for the admin/operator split and the
/// audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
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
    fn test_payment_status_derivation() {
        let total = dec("118.00");
        assert_eq!(
            PaymentStatus::derive(Decimal::ZERO, total),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::derive(dec("50.00"), total),
            PaymentStatus::Partial
        );
        assert_eq!(
            PaymentStatus::derive(dec("118.00"), total),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_snapshot_freezes_current_values() {
        let settings = BusinessSettings {
            default_tax_rate: dec("18"),
            business_name: "Sharma Service Center".to_string(),
            business_address: "12 MG Road, Bengaluru".to_string(),
            branding_ref: Some("logo-v2".to_string()),
            updated_at: Utc::now(),
        };
        let snapshot = settings.snapshot();
        assert_eq!(snapshot.tax_rate, dec("18"));
        assert_eq!(snapshot.business_name, "Sharma Service Center");
        assert_eq!(snapshot.branding_ref.as_deref(), Some("logo-v2"));
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let mut invoice = sample_invoice();
        invoice.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        invoice.payment_status = PaymentStatus::Partial;
        assert!(invoice.is_overdue(today));

        invoice.payment_status = PaymentStatus::Paid;
        assert!(!invoice.is_overdue(today));

        invoice.due_date = None;
        invoice.payment_status = PaymentStatus::Pending;
        assert!(!invoice.is_overdue(today));
    }

    fn sample_invoice() -> Invoice {
        let now = Utc::now();
        Invoice {
            id: "inv-1".to_string(),
            invoice_number: "INV-20260315-0001".to_string(),
            customer_id: "cust-1".to_string(),
            description: None,
            terms_and_conditions: None,
            subtotal: dec("100.00"),
            tax_rate: dec("18"),
            tax_amount: dec("18.00"),
            total_amount: dec("118.00"),
            paid_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            lifecycle_status: LifecycleStatus::Active,
            is_deleted: false,
            deleted_at: None,
            due_date: None,
            settings_snapshot: SettingsSnapshot {
                tax_rate: dec("18"),
                business_name: "Test".to_string(),
                business_address: "Test".to_string(),
                branding_ref: None,
            },
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }
}
