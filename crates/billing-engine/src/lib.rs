//! # billing-engine: Domain Services
//!
//! Orchestration layer between the pure domain logic in `billing-core`
//! and the SQLite storage in `billing-db`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │      transport / rendering (external collaborators)  │
//! └───────────────────────────┬─────────────────────────┘
//!                             │
//! ┌───────────────────────────▼─────────────────────────┐
//! │                       Engine                         │
//! │  ┌───────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ │
//! │  │ Customer  │ │ Invoice  │ │ Settings │ │ Audit  │ │
//! │  │ Service   │ │ Service  │ │ Service  │ │ Service│ │
//! │  └───────────┘ └──────────┘ └──────────┘ └────────┘ │
//! └───────────────────────────┬─────────────────────────┘
//!                             │
//! ┌───────────────────────────▼─────────────────────────┐
//! │        billing-db (repositories over SQLite)         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billing_db::{Database, DbConfig};
//! use billing_engine::Engine;
//!
//! let db = Database::new(DbConfig::new("billing.db")).await?;
//! let engine = Engine::new(db);
//! let invoices = engine.invoices().list_active(None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod customer;
pub mod error;
pub mod invoice;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::AuditService;
pub use customer::{CustomerRecord, CustomerService};
pub use error::{EngineError, EngineResult};
pub use invoice::InvoiceService;
pub use settings::SettingsService;

use billing_db::Database;

/// Facade bundling all services over one database handle.
///
/// Services are cheap to construct (they clone the pooled handle), so the
/// accessors hand out fresh instances instead of caching them.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
}

impl Engine {
    /// Creates the engine over an opened database.
    pub fn new(db: Database) -> Self {
        Engine { db }
    }

    /// Customer registry operations.
    pub fn customers(&self) -> CustomerService {
        CustomerService::new(self.db.clone())
    }

    /// Invoice lifecycle operations.
    pub fn invoices(&self) -> InvoiceService {
        InvoiceService::new(self.db.clone())
    }

    /// Settings read/update operations.
    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.db.clone())
    }

    /// Download audit operations.
    pub fn audit(&self) -> AuditService {
        AuditService::new(self.db.clone())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}
