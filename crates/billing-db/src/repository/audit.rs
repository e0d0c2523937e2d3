//! # Download Audit Repository
//!
//! Append-only storage for invoice render/download events. Entries are
//! never mutated or deleted here; retention is a policy of the hosting
//! storage, not of this code.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use billing_core::{DownloadAction, DownloadAuditEntry};

/// Repository for the invoice download audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: String,
    invoice_id: String,
    actor_id: Option<String>,
    action: DownloadAction,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for DownloadAuditEntry {
    fn from(row: AuditRow) -> Self {
        DownloadAuditEntry {
            id: row.id,
            invoice_id: row.invoice_id,
            actor_id: row.actor_id,
            action: row.action,
            created_at: row.created_at,
        }
    }
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one immutable audit entry.
    pub async fn append(&self, entry: &DownloadAuditEntry) -> DbResult<()> {
        debug!(invoice_id = %entry.invoice_id, action = ?entry.action, "Recording download");

        sqlx::query(
            r#"
            INSERT INTO invoice_download_audit (id, invoice_id, actor_id, action, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.invoice_id)
        .bind(&entry.actor_id)
        .bind(entry.action)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the audit trail for an invoice, oldest first.
    pub async fn list_for_invoice(&self, invoice_id: &str) -> DbResult<Vec<DownloadAuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, actor_id, action, created_at
            FROM invoice_download_audit
            WHERE invoice_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DownloadAuditEntry::from).collect())
    }
}
