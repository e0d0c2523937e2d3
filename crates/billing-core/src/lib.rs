//! # billing-core: Pure Business Logic for the Billing Engine
//!
//! This crate is the **heart** of the billing system. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    External collaborators                           │
//! │        HTTP/REST transport • auth middleware • PDF renderer         │
//! └───────────────────────────────┬─────────────────────────────────────┘
//! ┌───────────────────────────────▼─────────────────────────────────────┐
//! │                 billing-engine (domain services)                    │
//! │      CustomerService • InvoiceService • Settings • Audit            │
//! └───────────────────────────────┬─────────────────────────────────────┘
//! ┌───────────────────────────────▼─────────────────────────────────────┐
//! │                 ★ billing-core (THIS CRATE) ★                       │
//! │                                                                     │
//! │   ┌────────┐ ┌────────┐ ┌────────┐ ┌────────────┐ ┌───────────┐   │
//! │   │ types  │ │ money  │ │ mobile │ │ validation │ │   input   │   │
//! │   └────────┘ └────────┘ └────────┘ └────────────┘ └───────────┘   │
//! │                                                                     │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS               │
//! └───────────────────────────────┬─────────────────────────────────────┘
//! ┌───────────────────────────────▼─────────────────────────────────────┐
//! │                  billing-db (storage layer)                         │
//! │           SQLite queries, migrations, repositories                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Invoice, SettingsSnapshot, ...)
//! - [`money`] - Exact decimal arithmetic and HALF_UP quantization
//! - [`mobile`] - Mobile number normalization for duplicate detection
//! - [`numbering`] - Human invoice number formatting
//! - [`input`] - Loose-JSON coercion into canonical request structs
//! - [`validation`] - Field and business-rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Exact Decimals**: monetary values are `rust_decimal::Decimal`;
//!    binary floating point never touches money
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod mobile;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum page size for active-invoice and customer listings.
///
/// ## Business Reason
/// Listings are for the operator's recent-work view; anything beyond this
/// goes through reporting, not the live API.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Attempts made against the numbering/revision uniqueness scope before a
/// transient Conflict is surfaced to the caller.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;
