//! # Customer Service
//!
//! Registry operations over customers: creation with normalization,
//! duplicate flagging, lookup, update, and the exact-match reuse path the
//! invoice engine uses.
//!
//! ## Duplicate Policy
//! ```text
//! same normalized mobile on two ACTIVE customers
//!      │
//!      ├── NOT an error: family members share phones
//!      ▼
//! duplicate_warning: true   (computed fresh on every read, never stored)
//! ```

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use billing_core::input::{CreateCustomerInput, UpdateCustomerInput};
use billing_core::mobile::normalize_mobile;
use billing_core::validation::{validate_address, validate_customer_name, validate_email};
use billing_core::{CoreError, Customer, CustomerStatus};
use billing_db::Database;

use crate::error::{EngineError, EngineResult};

/// A customer together with its freshly computed duplicate flag.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub customer: Customer,
    /// True when another active customer shares this normalized mobile.
    pub duplicate_warning: bool,
}

/// Service for customer registry operations.
#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    /// Creates a new CustomerService.
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    /// Creates a customer.
    ///
    /// The mobile is normalized before storage; at least one of mobile /
    /// email must survive validation. A shared mobile is reported via
    /// `duplicate_warning`, never rejected.
    pub async fn create(&self, input: CreateCustomerInput) -> EngineResult<CustomerRecord> {
        let name = validate_customer_name(input.name.as_deref().unwrap_or(""))?;
        let mobile = input
            .mobile
            .as_deref()
            .map(normalize_mobile)
            .transpose()?;
        let email = input
            .email
            .as_deref()
            .map(validate_email)
            .transpose()?;

        if mobile.is_none() && email.is_none() {
            return Err(CoreError::MissingContactMethod.into());
        }

        let address = input
            .address
            .as_deref()
            .map(validate_address)
            .transpose()?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name,
            mobile,
            email,
            address,
            city: input.city,
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.db.customers().insert(&customer).await?;
        info!(id = %customer.id, "Created customer");

        let duplicate_warning = self.duplicate_flag(&customer).await?;
        Ok(CustomerRecord {
            customer,
            duplicate_warning,
        })
    }

    /// Fetches a customer by id.
    pub async fn get(&self, id: &str) -> EngineResult<CustomerRecord> {
        let customer = self
            .db
            .customers()
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Customer",
                id: id.to_string(),
            })?;

        let duplicate_warning = self.duplicate_flag(&customer).await?;
        Ok(CustomerRecord {
            customer,
            duplicate_warning,
        })
    }

    /// Applies a partial update to a customer.
    ///
    /// A mobile change is re-normalized and the update must not strip the
    /// last remaining contact method.
    pub async fn update(&self, id: &str, input: UpdateCustomerInput) -> EngineResult<CustomerRecord> {
        let mut customer = self
            .db
            .customers()
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Customer",
                id: id.to_string(),
            })?;

        if let Some(name) = &input.name {
            customer.name = validate_customer_name(name)?;
        }
        if let Some(mobile) = &input.mobile {
            customer.mobile = Some(normalize_mobile(mobile)?);
        }
        if let Some(email) = &input.email {
            customer.email = Some(validate_email(email)?);
        }
        if let Some(address) = &input.address {
            customer.address = Some(validate_address(address)?);
        }
        if let Some(city) = &input.city {
            customer.city = Some(city.trim().to_string());
        }
        if let Some(status) = input.status {
            customer.status = status;
        }

        if customer.mobile.is_none() && customer.email.is_none() {
            return Err(CoreError::MissingContactMethod.into());
        }

        customer.updated_at = Utc::now();

        let updated = self.db.customers().update(&customer).await?;
        if !updated {
            return Err(EngineError::NotFound {
                entity: "Customer",
                id: id.to_string(),
            });
        }
        info!(id = %customer.id, "Updated customer");

        let duplicate_warning = self.duplicate_flag(&customer).await?;
        Ok(CustomerRecord {
            customer,
            duplicate_warning,
        })
    }

    /// Lists recently created customers, newest first, each with its
    /// current duplicate flag.
    pub async fn list(&self, limit: i64) -> EngineResult<Vec<CustomerRecord>> {
        let limit = limit.clamp(1, billing_core::MAX_LIST_LIMIT);
        let customers = self.db.customers().list_recent(limit).await?;

        let mut records = Vec::with_capacity(customers.len());
        for customer in customers {
            let duplicate_warning = self.duplicate_flag(&customer).await?;
            records.push(CustomerRecord {
                customer,
                duplicate_warning,
            });
        }
        Ok(records)
    }

    /// Reuses or creates a customer for the invoice-creation convenience
    /// path.
    ///
    /// An exact match on (name, normalized mobile) is reused as-is; any
    /// other combination creates a fresh customer so that two people
    /// sharing a phone stay distinct records. A supplied email lands on
    /// the newly created customer; an existing match keeps its own
    /// contact details.
    pub async fn find_or_create(
        &self,
        name: &str,
        mobile: &str,
        email: Option<&str>,
    ) -> EngineResult<CustomerRecord> {
        let name = validate_customer_name(name)?;
        let mobile = normalize_mobile(mobile)?;

        if let Some(existing) = self.db.customers().find_exact(&name, &mobile).await? {
            debug!(id = %existing.id, "Reusing exact customer match");
            let duplicate_warning = self.duplicate_flag(&existing).await?;
            return Ok(CustomerRecord {
                customer: existing,
                duplicate_warning,
            });
        }

        self.create(CreateCustomerInput {
            name: Some(name),
            mobile: Some(mobile),
            email: email.map(str::to_string),
            ..CreateCustomerInput::default()
        })
        .await
    }

    /// Computes the read-time duplicate flag for one customer.
    async fn duplicate_flag(&self, customer: &Customer) -> EngineResult<bool> {
        let Some(mobile) = &customer.mobile else {
            return Ok(false);
        };
        let other = self
            .db
            .customers()
            .find_active_by_mobile(mobile, Some(&customer.id))
            .await?;
        Ok(other.is_some())
    }
}
