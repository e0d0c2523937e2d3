//! # Download Audit Service
//!
//! Records invoice print/PDF events into the append-only trail.
//!
//! Recording is soft-fail: the document was already produced by the time
//! this runs, so a storage hiccup here is logged and swallowed rather
//! than failing the caller's download.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use billing_core::{DownloadAction, DownloadAuditEntry};
use billing_db::Database;

use crate::error::EngineResult;

/// Service for the invoice download audit trail.
#[derive(Debug, Clone)]
pub struct AuditService {
    db: Database,
}

impl AuditService {
    /// Creates a new AuditService.
    pub fn new(db: Database) -> Self {
        AuditService { db }
    }

    /// Records one download event. Never fails the caller; a write error
    /// is logged and discarded.
    pub async fn record(
        &self,
        invoice_id: &str,
        actor_id: Option<&str>,
        action: DownloadAction,
    ) -> EngineResult<()> {
        let entry = DownloadAuditEntry {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            actor_id: actor_id.map(str::to_string),
            action,
            created_at: Utc::now(),
        };

        if let Err(err) = self.db.audit().append(&entry).await {
            warn!(invoice_id, error = %err, "Failed to record download audit entry");
        }
        Ok(())
    }

    /// Reads the audit trail for an invoice, oldest first.
    pub async fn history(&self, invoice_id: &str) -> EngineResult<Vec<DownloadAuditEntry>> {
        Ok(self.db.audit().list_for_invoice(invoice_id).await?)
    }
}
