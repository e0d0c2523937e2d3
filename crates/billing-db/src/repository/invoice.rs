//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Invoice Lifecycle (storage view)
//! ```text
//! 1. CREATE
//!    └── insert_with_lines() → invoice + lines in one transaction
//!
//! 2. EDIT (amounts, payments, cancellation label)
//!    └── update_checked() → full-row write guarded by revision
//!        (rows_affected = 0 means a concurrent writer won; re-read & retry)
//!
//! 3. SOFT DELETE
//!    └── soft_delete() → guarded by is_deleted = 0, so the second call
//!        is a no-op (idempotent); bumps revision to fail racing edits
//! ```
//!
//! Amount columns are TEXT round-tripped through exact decimals; the
//! settings snapshot is a frozen JSON document.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use billing_core::{Invoice, InvoiceLine, LifecycleStatus, PaymentStatus, SettingsSnapshot};

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: String,
    invoice_number: String,
    customer_id: String,
    description: Option<String>,
    terms_and_conditions: Option<String>,
    subtotal: String,
    tax_rate: String,
    tax_amount: String,
    total_amount: String,
    paid_amount: String,
    payment_status: PaymentStatus,
    lifecycle_status: LifecycleStatus,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    due_date: Option<NaiveDate>,
    settings_snapshot: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: i64,
}

#[derive(Debug, FromRow)]
struct LineRow {
    id: String,
    invoice_id: String,
    description: String,
    quantity: i64,
    unit_price: String,
    line_total: String,
}

fn parse_decimal(entity: &str, id: &str, column: &str, raw: &str) -> DbResult<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|_| DbError::corrupt(entity, id, column))
}

impl InvoiceRow {
    fn into_invoice(self, lines: Vec<InvoiceLine>) -> DbResult<Invoice> {
        let snapshot: SettingsSnapshot = serde_json::from_str(&self.settings_snapshot)
            .map_err(|_| DbError::corrupt("Invoice", &self.id, "settings_snapshot"))?;

        Ok(Invoice {
            subtotal: parse_decimal("Invoice", &self.id, "subtotal", &self.subtotal)?,
            tax_rate: parse_decimal("Invoice", &self.id, "tax_rate", &self.tax_rate)?,
            tax_amount: parse_decimal("Invoice", &self.id, "tax_amount", &self.tax_amount)?,
            total_amount: parse_decimal("Invoice", &self.id, "total_amount", &self.total_amount)?,
            paid_amount: parse_decimal("Invoice", &self.id, "paid_amount", &self.paid_amount)?,
            id: self.id,
            invoice_number: self.invoice_number,
            customer_id: self.customer_id,
            description: self.description,
            terms_and_conditions: self.terms_and_conditions,
            payment_status: self.payment_status,
            lifecycle_status: self.lifecycle_status,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            due_date: self.due_date,
            settings_snapshot: snapshot,
            lines,
            created_at: self.created_at,
            updated_at: self.updated_at,
            revision: self.revision,
        })
    }
}

impl LineRow {
    fn into_line(self) -> DbResult<InvoiceLine> {
        Ok(InvoiceLine {
            unit_price: parse_decimal("InvoiceLine", &self.id, "unit_price", &self.unit_price)?,
            line_total: parse_decimal("InvoiceLine", &self.id, "line_total", &self.line_total)?,
            id: self.id,
            invoice_id: self.invoice_id,
            description: self.description,
            quantity: self.quantity,
        })
    }
}

const INVOICE_COLUMNS: &str = "id, invoice_number, customer_id, description, terms_and_conditions, \
     subtotal, tax_rate, tax_amount, total_amount, paid_amount, \
     payment_status, lifecycle_status, is_deleted, deleted_at, due_date, \
     settings_snapshot, created_at, updated_at, revision";

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Inserts an invoice and its line items in one transaction.
    ///
    /// Either the whole document lands or nothing does; a unique-violation
    /// on `invoice_number` (numbering race residue) rolls everything back
    /// so the caller can retry with a fresh sequence.
    pub async fn insert_with_lines(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, invoice_number = %invoice.invoice_number, "Inserting invoice");

        let snapshot = serde_json::to_string(&invoice.settings_snapshot)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_id, description, terms_and_conditions,
                subtotal, tax_rate, tax_amount, total_amount, paid_amount,
                payment_status, lifecycle_status, is_deleted, deleted_at, due_date,
                settings_snapshot, created_at, updated_at, revision
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_id)
        .bind(&invoice.description)
        .bind(&invoice.terms_and_conditions)
        .bind(invoice.subtotal.to_string())
        .bind(invoice.tax_rate.to_string())
        .bind(invoice.tax_amount.to_string())
        .bind(invoice.total_amount.to_string())
        .bind(invoice.paid_amount.to_string())
        .bind(invoice.payment_status)
        .bind(invoice.lifecycle_status)
        .bind(invoice.is_deleted)
        .bind(invoice.deleted_at)
        .bind(invoice.due_date)
        .bind(&snapshot)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .bind(invoice.revision)
        .execute(&mut *tx)
        .await?;

        for (position, line) in invoice.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_lines (
                    id, invoice_id, description, quantity, unit_price, line_total, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&line.invoice_id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price.to_string())
            .bind(line.line_total.to_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an invoice by ID, with its lines.
    ///
    /// Soft-deleted invoices ARE returned; the flag is visible on the
    /// result so callers can distinguish.
    pub async fn get(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let lines = self.get_lines(id).await?;
        Ok(Some(row.into_invoice(lines)?))
    }

    /// Gets the line items for an invoice, in insertion order.
    pub async fn get_lines(&self, invoice_id: &str) -> DbResult<Vec<InvoiceLine>> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, description, quantity, unit_price, line_total
            FROM invoice_lines
            WHERE invoice_id = ?1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineRow::into_line).collect()
    }

    /// Lists non-deleted invoices, newest first.
    ///
    /// Line items are not hydrated here; listings are the operator's
    /// recent-work view and fetch the full document via `get` on demand.
    /// Cancelled invoices still appear: cancellation is a label, not a
    /// visibility filter.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE is_deleted = 0
            ORDER BY created_at DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_invoice(Vec::new()))
            .collect()
    }

    /// Writes back a mutated invoice, guarded by the revision the caller
    /// read.
    ///
    /// Returns false when the guarded UPDATE hit no row - a concurrent
    /// writer (edit or soft delete) got there first and the caller must
    /// re-read and retry. The stored revision is bumped on success.
    pub async fn update_checked(&self, invoice: &Invoice, expected_revision: i64) -> DbResult<bool> {
        debug!(id = %invoice.id, revision = expected_revision, "Updating invoice");

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                description = ?2,
                terms_and_conditions = ?3,
                subtotal = ?4,
                tax_rate = ?5,
                tax_amount = ?6,
                total_amount = ?7,
                paid_amount = ?8,
                payment_status = ?9,
                lifecycle_status = ?10,
                due_date = ?11,
                updated_at = ?12,
                revision = revision + 1
            WHERE id = ?1 AND revision = ?13 AND is_deleted = 0
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.description)
        .bind(&invoice.terms_and_conditions)
        .bind(invoice.subtotal.to_string())
        .bind(invoice.tax_rate.to_string())
        .bind(invoice.tax_amount.to_string())
        .bind(invoice.total_amount.to_string())
        .bind(invoice.paid_amount.to_string())
        .bind(invoice.payment_status)
        .bind(invoice.lifecycle_status)
        .bind(invoice.due_date)
        .bind(invoice.updated_at)
        .bind(expected_revision)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks an invoice deleted. Guarded by `is_deleted = 0` so a repeat
    /// call affects no rows (idempotence); bumps the revision so racing
    /// edits fail their revision check and observe the deletion.
    ///
    /// Returns the number of rows affected (0 or 1). Payment and tax
    /// fields are untouched.
    pub async fn soft_delete(&self, id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                is_deleted = 1,
                deleted_at = ?2,
                updated_at = ?2,
                revision = revision + 1
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Checks whether an invoice id exists at all (deleted or not).
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
