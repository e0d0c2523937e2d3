//! # Repository Module
//!
//! Repository implementations, one per aggregate:
//!
//! - [`customer`] - Customer records and the duplicate-detection probe
//! - [`invoice`] - Invoices, lines, revision-checked updates, soft delete
//! - [`numbering`] - Per-day invoice numbering counter
//! - [`settings`] - The settings singleton
//! - [`audit`] - Append-only download audit trail

pub mod audit;
pub mod customer;
pub mod invoice;
pub mod numbering;
pub mod settings;
