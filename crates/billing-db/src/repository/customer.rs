//! # Customer Repository
//!
//! Database operations for customer records.
//!
//! ## Duplicate Detection
//! ```text
//! create / update / get
//!      │
//!      ▼
//! find_active_by_mobile(normalized, exclude_id)
//!      │   single equality probe on idx_customers_mobile_status
//!      ▼
//! duplicate_warning flag (computed at read time, never stored)
//! ```
//!
//! Mobile numbers are deliberately NOT unique; duplicates are allowed and
//! only flagged. Customers are never hard-deleted (status flips instead).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use billing_core::{Customer, CustomerStatus};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    mobile: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    status: CustomerStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            mobile: row.mobile,
            email: row.email,
            address: row.address,
            city: row.city,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, name, mobile, email, address, city, status, created_at, updated_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, mobile, email, address, city, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(customer.status)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Writes back a mutated customer. Returns false when the id is unknown.
    pub async fn update(&self, customer: &Customer) -> DbResult<bool> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                mobile = ?3,
                email = ?4,
                address = ?5,
                city = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(customer.status)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Equality probe for duplicate detection: does any *other* active
    /// customer share this normalized mobile?
    ///
    /// Single indexed lookup; the flag is always computed from current
    /// state at read time, never cached.
    pub async fn find_active_by_mobile(
        &self,
        mobile: &str,
        exclude_id: Option<&str>,
    ) -> DbResult<Option<String>> {
        let id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM customers
            WHERE mobile = ?1
              AND status = 'active'
              AND (?2 IS NULL OR id != ?2)
            LIMIT 1
            "#,
        )
        .bind(mobile)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Exact name + normalized-mobile match, used by the invoice-creation
    /// convenience path to reuse a customer instead of duplicating it.
    pub async fn find_exact(&self, name: &str, mobile: &str) -> DbResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE name = ?1 AND mobile = ?2
            ORDER BY created_at
            LIMIT 1
            "#
        ))
        .bind(name)
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Lists the most recently created customers.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            ORDER BY created_at DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
