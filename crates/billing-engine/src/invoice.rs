//! # Invoice Service
//!
//! The invoice lifecycle engine: creation with number allocation and
//! settings freezing, validated edits with recomputation, idempotent soft
//! deletion, and listing.
//!
//! ## Write Concurrency
//! ```text
//! update(id, changes)
//!      │
//!      ▼
//! read current row ── revision N
//!      │
//!      ▼
//! apply + validate change set in memory
//!      │
//!      ▼
//! UPDATE ... WHERE id = ? AND revision = N AND is_deleted = 0
//!      │
//!      ├── 1 row  → done, revision is now N+1
//!      └── 0 rows → lost the race (or row was deleted); re-read,
//!                   retry up to MAX_WRITE_ATTEMPTS, then Conflict
//! ```
//!
//! Soft delete also bumps the revision, so an edit racing a delete either
//! lands first or re-reads the deleted row and fails with `InvalidState`.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use billing_core::input::{CreateInvoiceInput, UpdateInvoiceInput};
use billing_core::money::compute_amounts;
use billing_core::numbering::format_invoice_number;
use billing_core::validation::{
    parse_due_date, validate_line, validate_lines_total, validate_paid_amount, validate_subtotal,
    validate_tax_rate,
};
use billing_core::{
    Invoice, InvoiceLine, LifecycleStatus, PaymentStatus, ValidationError, MAX_LIST_LIMIT,
    MAX_WRITE_ATTEMPTS,
};
use billing_db::Database;

use crate::customer::CustomerService;
use crate::error::{EngineError, EngineResult};

/// Service for the invoice lifecycle.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    db: Database,
    customers: CustomerService,
}

impl InvoiceService {
    /// Creates a new InvoiceService.
    pub fn new(db: Database) -> Self {
        let customers = CustomerService::new(db.clone());
        InvoiceService { db, customers }
    }

    /// Creates an invoice.
    ///
    /// Resolves the customer (by id, or by the name+mobile convenience
    /// pair), validates amounts, freezes the current settings into the
    /// invoice, and allocates the next `INV-YYYYMMDD-NNNN` number. The
    /// new invoice starts unpaid, active, revision 0.
    pub async fn create(&self, input: CreateInvoiceInput) -> EngineResult<Invoice> {
        let customer = self.resolve_customer(&input).await?;

        let due_date = input
            .due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()?;

        let invoice_id = Uuid::new_v4().to_string();
        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let line_total = validate_line(&line.description, line.quantity, line.unit_price)?;
            lines.push(InvoiceLine {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice_id.clone(),
                description: line.description.trim().to_string(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total,
            });
        }

        // Subtotal is either derived from the lines or supplied directly;
        // when both are present they must agree exactly.
        let subtotal = match (input.subtotal, lines.is_empty()) {
            (Some(subtotal), true) => validate_subtotal(subtotal)?,
            (Some(subtotal), false) => {
                let subtotal = validate_subtotal(subtotal)?;
                validate_lines_total(&lines, subtotal)?;
                subtotal
            }
            (None, false) => lines.iter().map(|l| l.line_total).sum(),
            (None, true) => {
                return Err(ValidationError::Required {
                    field: "subtotal".to_string(),
                }
                .into())
            }
        };

        let settings = self.db.settings().get().await?;
        let tax_rate = match input.tax_rate {
            Some(rate) => validate_tax_rate(rate)?,
            None => settings.default_tax_rate,
        };
        let amounts = compute_amounts(subtotal, tax_rate);

        // Freeze the rate actually applied, not just the live default.
        let mut snapshot = settings.snapshot();
        snapshot.tax_rate = tax_rate;

        let now = Utc::now();
        let mut invoice = Invoice {
            id: invoice_id,
            invoice_number: String::new(),
            customer_id: customer.id,
            description: input.description,
            terms_and_conditions: input.terms_and_conditions,
            subtotal,
            tax_rate,
            tax_amount: amounts.tax_amount,
            total_amount: amounts.total_amount,
            paid_amount: rust_decimal::Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            lifecycle_status: LifecycleStatus::Active,
            is_deleted: false,
            deleted_at: None,
            due_date,
            settings_snapshot: snapshot,
            lines,
            created_at: now,
            updated_at: now,
            revision: 0,
        };

        // The counter makes collisions unreachable in a single deployment,
        // but the UNIQUE index is still the last word: on a violation,
        // allocate a fresh number and try again.
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let today = Utc::now().date_naive();
            let seq = self.db.numbering().next_sequence(today).await?;
            invoice.invoice_number = format_invoice_number(today, seq);

            match self.db.invoices().insert_with_lines(&invoice).await {
                Ok(()) => {
                    info!(
                        id = %invoice.id,
                        number = %invoice.invoice_number,
                        total = %invoice.total_amount,
                        "Created invoice"
                    );
                    return Ok(invoice);
                }
                Err(err) if err.is_unique_violation() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        number = %invoice.invoice_number,
                        attempt,
                        "Invoice number collision, reallocating"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(EngineError::Conflict {
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }

    /// Fetches an invoice by id, soft-deleted ones included.
    pub async fn get(&self, id: &str) -> EngineResult<Invoice> {
        self.db
            .invoices()
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Invoice",
                id: id.to_string(),
            })
    }

    /// Lists non-deleted invoices, newest first. Cancelled invoices are
    /// included; cancellation is a label, not a visibility state.
    pub async fn list_active(&self, limit: Option<i64>) -> EngineResult<Vec<Invoice>> {
        let limit = limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        Ok(self.db.invoices().list_active(limit).await?)
    }

    /// Applies a partial edit to an invoice.
    ///
    /// Amount changes recompute tax and total and re-derive the payment
    /// status; a payment change is validated against the (possibly
    /// recomputed) total. Nothing is written unless the whole change set
    /// validates.
    pub async fn update(&self, id: &str, changes: UpdateInvoiceInput) -> EngineResult<Invoice> {
        for _attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.get(id).await?;
            if current.is_deleted {
                return Err(EngineError::InvalidState { id: id.to_string() });
            }

            let mut next = current.clone();
            apply_changes(&mut next, &changes)?;
            next.updated_at = Utc::now();

            if self
                .db
                .invoices()
                .update_checked(&next, current.revision)
                .await?
            {
                next.revision = current.revision + 1;
                info!(
                    id = %next.id,
                    total = %next.total_amount,
                    paid = %next.paid_amount,
                    status = ?next.payment_status,
                    "Updated invoice"
                );
                return Ok(next);
            }

            warn!(id, revision = current.revision, "Invoice update lost a race, retrying");
        }

        Err(EngineError::Conflict {
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }

    /// Soft-deletes an invoice.
    ///
    /// Idempotent: deleting an already-deleted invoice succeeds without
    /// touching the row. Only an id that was never issued is an error.
    pub async fn soft_delete(&self, id: &str) -> EngineResult<()> {
        let rows = self.db.invoices().soft_delete(id, Utc::now()).await?;
        if rows > 0 {
            info!(id, "Soft-deleted invoice");
            return Ok(());
        }

        if self.db.invoices().exists(id).await? {
            // Already deleted; nothing to do.
            return Ok(());
        }
        Err(EngineError::NotFound {
            entity: "Invoice",
            id: id.to_string(),
        })
    }

    async fn resolve_customer(
        &self,
        input: &CreateInvoiceInput,
    ) -> EngineResult<billing_core::Customer> {
        if let Some(customer_id) = &input.customer_id {
            return self
                .db
                .customers()
                .get(customer_id)
                .await?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "Customer",
                    id: customer_id.clone(),
                });
        }

        let name = input
            .customer_name
            .as_deref()
            .ok_or_else(|| ValidationError::Required {
                field: "customer_name".to_string(),
            })?;
        let mobile = input
            .customer_mobile
            .as_deref()
            .ok_or_else(|| ValidationError::Required {
                field: "customer_mobile".to_string(),
            })?;

        Ok(self
            .customers
            .find_or_create(name, mobile, input.customer_email.as_deref())
            .await?
            .customer)
    }
}

/// Applies one validated change set to an in-memory invoice.
///
/// Kept free of I/O so the whole set validates (or fails) before any row
/// is touched.
fn apply_changes(invoice: &mut Invoice, changes: &UpdateInvoiceInput) -> EngineResult<()> {
    if let Some(description) = &changes.description {
        invoice.description = Some(description.clone());
    }
    if let Some(terms) = &changes.terms_and_conditions {
        invoice.terms_and_conditions = Some(terms.clone());
    }
    if let Some(raw) = &changes.due_date {
        invoice.due_date = Some(parse_due_date(raw)?);
    }
    if let Some(lifecycle) = changes.lifecycle_status {
        invoice.lifecycle_status = lifecycle;
    }

    let recompute = changes.subtotal.is_some() || changes.tax_rate.is_some();
    if let Some(subtotal) = changes.subtotal {
        // A direct subtotal edit on a line-itemized invoice would detach
        // the stored lines from the amounts they decompose.
        if !invoice.lines.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "subtotal".to_string(),
                reason: "subtotal is derived from line items on this invoice".to_string(),
            }
            .into());
        }
        invoice.subtotal = validate_subtotal(subtotal)?;
    }
    if let Some(tax_rate) = changes.tax_rate {
        invoice.tax_rate = validate_tax_rate(tax_rate)?;
    }

    if recompute {
        let amounts = compute_amounts(invoice.subtotal, invoice.tax_rate);
        invoice.tax_amount = amounts.tax_amount;
        invoice.total_amount = amounts.total_amount;

        // When the recomputed total drops below what was already paid,
        // clamp rather than leave an overpaid row behind.
        if invoice.paid_amount > invoice.total_amount {
            invoice.paid_amount = invoice.total_amount;
        }
    }

    if let Some(paid) = changes.paid_amount {
        invoice.paid_amount = validate_paid_amount(paid, invoice.total_amount)?;
    }

    invoice.payment_status = PaymentStatus::derive(invoice.paid_amount, invoice.total_amount);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_core::SettingsSnapshot;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_invoice() -> Invoice {
        let now = Utc::now();
        Invoice {
            id: "inv-1".to_string(),
            invoice_number: "INV-20260830-0001".to_string(),
            customer_id: "cust-1".to_string(),
            description: None,
            terms_and_conditions: None,
            subtotal: dec("1000.00"),
            tax_rate: dec("0"),
            tax_amount: dec("0.00"),
            total_amount: dec("1000.00"),
            paid_amount: dec("1000.00"),
            payment_status: PaymentStatus::Paid,
            lifecycle_status: LifecycleStatus::Active,
            is_deleted: false,
            deleted_at: None,
            due_date: None,
            settings_snapshot: SettingsSnapshot {
                tax_rate: dec("0"),
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

    #[test]
    fn test_edit_recompute_downgrades_paid_to_partial() {
        let mut invoice = sample_invoice();
        let changes = UpdateInvoiceInput {
            subtotal: Some(dec("1200.00")),
            ..UpdateInvoiceInput::default()
        };
        apply_changes(&mut invoice, &changes).unwrap();

        assert_eq!(invoice.total_amount, dec("1200.00"));
        assert_eq!(invoice.paid_amount, dec("1000.00"));
        assert_eq!(invoice.payment_status, PaymentStatus::Partial);
        assert_eq!(invoice.outstanding_amount(), dec("200.00"));
    }

    #[test]
    fn test_edit_clamps_paid_when_total_drops() {
        let mut invoice = sample_invoice();
        let changes = UpdateInvoiceInput {
            subtotal: Some(dec("800.00")),
            ..UpdateInvoiceInput::default()
        };
        apply_changes(&mut invoice, &changes).unwrap();

        assert_eq!(invoice.total_amount, dec("800.00"));
        assert_eq!(invoice.paid_amount, dec("800.00"));
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_overpay_rejected_without_mutation_of_status() {
        let mut invoice = sample_invoice();
        invoice.total_amount = dec("500.00");
        invoice.paid_amount = dec("100.00");
        invoice.payment_status = PaymentStatus::Partial;

        let changes = UpdateInvoiceInput {
            paid_amount: Some(dec("500.01")),
            ..UpdateInvoiceInput::default()
        };
        let err = apply_changes(&mut invoice, &changes).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(billing_core::CoreError::OverpayNotAllowed { .. })
        ));
    }

    #[test]
    fn test_cancellation_is_a_pure_label() {
        let mut invoice = sample_invoice();
        let changes = UpdateInvoiceInput {
            lifecycle_status: Some(LifecycleStatus::Cancelled),
            paid_amount: Some(dec("1000.00")),
            ..UpdateInvoiceInput::default()
        };
        apply_changes(&mut invoice, &changes).unwrap();

        assert_eq!(invoice.lifecycle_status, LifecycleStatus::Cancelled);
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_subtotal_edit_rejected_on_lined_invoice() {
        let mut invoice = sample_invoice();
        invoice.lines.push(InvoiceLine {
            id: "line-1".to_string(),
            invoice_id: invoice.id.clone(),
            description: "Oil change".to_string(),
            quantity: 1,
            unit_price: dec("1000.00"),
            line_total: dec("1000.00"),
        });

        let changes = UpdateInvoiceInput {
            subtotal: Some(dec("900.00")),
            ..UpdateInvoiceInput::default()
        };
        assert!(apply_changes(&mut invoice, &changes).is_err());
    }
}
