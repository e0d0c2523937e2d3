//! # Settings Service
//!
//! Read and admin-gated update of the business settings singleton.
//!
//! Updates only affect invoices issued afterwards; every existing invoice
//! keeps the snapshot frozen at its creation.

use chrono::Utc;
use tracing::info;

use billing_core::input::SettingsUpdate;
use billing_core::validation::validate_tax_rate;
use billing_core::{Actor, BusinessSettings, Role};
use billing_db::Database;

use crate::error::{EngineError, EngineResult};

/// Service for the business settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    /// Creates a new SettingsService.
    pub fn new(db: Database) -> Self {
        SettingsService { db }
    }

    /// Reads the live settings.
    pub async fn get(&self) -> EngineResult<BusinessSettings> {
        Ok(self.db.settings().get().await?)
    }

    /// Applies a partial settings update. Admin only.
    pub async fn update(
        &self,
        actor: &Actor,
        changes: SettingsUpdate,
    ) -> EngineResult<BusinessSettings> {
        if actor.role != Role::Admin {
            return Err(EngineError::Unauthorized);
        }

        let mut settings = self.db.settings().get().await?;

        if let Some(rate) = changes.default_tax_rate {
            settings.default_tax_rate = validate_tax_rate(rate)?;
        }
        if let Some(name) = changes.business_name {
            settings.business_name = name;
        }
        if let Some(address) = changes.business_address {
            settings.business_address = address;
        }
        if let Some(branding) = changes.branding_ref {
            settings.branding_ref = Some(branding);
        }

        settings.updated_at = Utc::now();
        self.db.settings().put(&settings).await?;
        info!(actor = %actor.id, rate = %settings.default_tax_rate, "Updated settings");

        Ok(settings)
    }
}
