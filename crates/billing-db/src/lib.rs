//! # billing-db: Database Layer for the Billing Engine
//!
//! SQLite storage via sqlx for the billing domain.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (customer, invoice,
//!   numbering, settings, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billing_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/billing.db")).await?;
//! let invoices = db.invoices().list_active(100).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::numbering::NumberingRepository;
pub use repository::settings::SettingsRepository;
