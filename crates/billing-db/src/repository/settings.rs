//! # Settings Repository
//!
//! Read/write access to the settings singleton (row id = 1, seeded by the
//! initial migration).
//!
//! Already-issued invoices are unaffected by updates here: they carry
//! their own frozen snapshot captured at create time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use billing_core::BusinessSettings;

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct SettingsRow {
    default_tax_rate: String,
    business_name: String,
    business_address: String,
    branding_ref: Option<String>,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> DbResult<BusinessSettings> {
        let default_tax_rate = self
            .default_tax_rate
            .parse::<Decimal>()
            .map_err(|_| DbError::corrupt("Settings", "1", "default_tax_rate"))?;

        Ok(BusinessSettings {
            default_tax_rate,
            business_name: self.business_name,
            business_address: self.business_address,
            branding_ref: self.branding_ref,
            updated_at: self.updated_at,
        })
    }
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the live settings record.
    ///
    /// The row is seeded by the initial migration; its absence means the
    /// schema was tampered with, surfaced as an internal error rather
    /// than a default value.
    pub async fn get(&self) -> DbResult<BusinessSettings> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT default_tax_rate, business_name, business_address, branding_ref, updated_at
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_settings(),
            None => Err(DbError::Internal(
                "settings singleton row is missing".to_string(),
            )),
        }
    }

    /// Writes back the full settings record in one atomic statement.
    pub async fn put(&self, settings: &BusinessSettings) -> DbResult<()> {
        debug!("Updating settings singleton");

        sqlx::query(
            r#"
            UPDATE settings SET
                default_tax_rate = ?1,
                business_name = ?2,
                business_address = ?3,
                branding_ref = ?4,
                updated_at = ?5
            WHERE id = 1
            "#,
        )
        .bind(settings.default_tax_rate.to_string())
        .bind(&settings.business_name)
        .bind(&settings.business_address)
        .bind(&settings.branding_ref)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
