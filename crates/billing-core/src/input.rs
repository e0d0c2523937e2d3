//! # Input Coercion
//!
//! Explicit mapping stage between loose caller JSON and the canonical
//! request structs the engine consumes.
//!
//! ## Coercion Strategy
//! ```text
//! Caller JSON (transport layer)
//! ├── camelCase or snake_case keys          → canonical field
//! ├── amounts as JSON numbers or strings    → exact Decimal
//! ├── legacy key spellings (amount, phone)  → canonical field
//! └── unknown fields                        → silently dropped
//!          │
//!          ▼
//! Canonical input struct (this module)
//!          │
//!          ▼
//! validation.rs / engine
//! ```
//!
//! Unknown fields never reach the domain model and are never echoed back;
//! ingestion stays forward-compatible as the transport grows new fields.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{CoreResult, ValidationError};
use crate::types::{CustomerStatus, LifecycleStatus};

// =============================================================================
// Canonical Request Structs
// =============================================================================

/// Canonical customer-creation request.
#[derive(Debug, Clone, Default)]
pub struct CreateCustomerInput {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Canonical customer-update request. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub status: Option<CustomerStatus>,
}

/// One line item in an invoice-creation request.
#[derive(Debug, Clone)]
pub struct LineInput {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Canonical invoice-creation request.
///
/// The customer is referenced either by `customer_id` or by the
/// name+mobile convenience pair (which reuses an exact match or creates
/// the customer on the fly).
#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceInput {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub customer_email: Option<String>,
    pub subtotal: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub description: Option<String>,
    pub terms_and_conditions: Option<String>,
    /// Raw due date; parsed (and rejected as MalformedDueDate) by the engine.
    pub due_date: Option<String>,
    pub lines: Vec<LineInput>,
}

/// Canonical invoice-update request. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    pub subtotal: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub description: Option<String>,
    pub terms_and_conditions: Option<String>,
    pub due_date: Option<String>,
    pub lifecycle_status: Option<LifecycleStatus>,
}

/// Canonical settings-update request (admin only, partial).
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub default_tax_rate: Option<Decimal>,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub branding_ref: Option<String>,
}

// =============================================================================
// Coercion Helpers
// =============================================================================

fn as_object(value: &Value) -> CoreResult<&Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ValidationError::InvalidFormat {
            field: "body".to_string(),
            reason: "expected a JSON object".to_string(),
        }
        .into()
    })
}

/// Looks a field up under any of its accepted spellings.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| map.get(*k))
        .filter(|v| !v.is_null())
}

/// Accepts strings and bare numbers (ids and phone numbers arrive as
/// either); objects, arrays, and booleans are dropped like unknown keys.
fn take_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(map, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a JSON number or numeric string into an exact Decimal.
///
/// JSON numbers round-trip through serde_json's shortest text form, never
/// through binary floating arithmetic.
fn take_decimal(
    map: &Map<String, Value>,
    keys: &[&str],
    field: &str,
) -> CoreResult<Option<Decimal>> {
    let raw = match lookup(map, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) | None => return Ok(None),
    };
    let parsed = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{raw}' is not a decimal number"),
        })?;
    Ok(Some(parsed))
}

fn take_i64(map: &Map<String, Value>, keys: &[&str], field: &str) -> CoreResult<Option<i64>> {
    let value = match lookup(map, keys) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) | None => return Ok(None),
    };
    match value {
        Some(v) => Ok(Some(v)),
        None => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "not an integer".to_string(),
        }
        .into()),
    }
}

/// Maps a status-ish value to the cancellation label.
///
/// Legacy callers send a grab-bag `status` field; only
/// active/cancelled map to the lifecycle label here. Payment status is
/// derived and never settable, so paid/pending spellings are dropped like
/// any other unknown input.
fn take_lifecycle(map: &Map<String, Value>) -> Option<LifecycleStatus> {
    let raw = take_string(map, &["lifecycle_status", "lifecycleStatus", "status"])?;
    match raw.to_ascii_lowercase().as_str() {
        "cancelled" | "canceled" => Some(LifecycleStatus::Cancelled),
        "active" => Some(LifecycleStatus::Active),
        _ => None,
    }
}

fn take_customer_status(map: &Map<String, Value>) -> Option<CustomerStatus> {
    // `is_active` style flags arrive as JSON booleans as often as strings.
    let raw = match lookup(map, &["status", "is_active", "isActive"])? {
        Value::String(s) => s.to_ascii_lowercase(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    match raw.as_str() {
        "inactive" | "false" => Some(CustomerStatus::Inactive),
        "active" | "true" => Some(CustomerStatus::Active),
        _ => None,
    }
}

// =============================================================================
// Public Coercion Entry Points
// =============================================================================

impl CreateCustomerInput {
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let map = as_object(value)?;
        Ok(CreateCustomerInput {
            name: take_string(map, &["name", "customer_name", "customerName"]),
            mobile: take_string(map, &["mobile", "phone", "mobile_number", "mobileNumber"]),
            email: take_string(map, &["email"]),
            address: take_string(map, &["address", "address_line", "addressLine"]),
            city: take_string(map, &["city"]),
        })
    }
}

impl UpdateCustomerInput {
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let map = as_object(value)?;
        Ok(UpdateCustomerInput {
            name: take_string(map, &["name"]),
            mobile: take_string(map, &["mobile", "phone", "mobile_number", "mobileNumber"]),
            email: take_string(map, &["email"]),
            address: take_string(map, &["address", "address_line", "addressLine"]),
            city: take_string(map, &["city"]),
            status: take_customer_status(map),
        })
    }
}

impl CreateInvoiceInput {
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let map = as_object(value)?;
        Ok(CreateInvoiceInput {
            customer_id: take_string(map, &["customer_id", "customerId"]),
            customer_name: take_string(map, &["customer_name", "customerName"]),
            customer_mobile: take_string(
                map,
                &["customer_mobile", "customerMobile", "customer_phone", "customerPhone"],
            ),
            customer_email: take_string(map, &["customer_email", "customerEmail"]),
            // "amount" is the legacy spelling for the pre-tax subtotal.
            subtotal: take_decimal(map, &["subtotal", "amount"], "subtotal")?,
            tax_rate: take_decimal(map, &["tax_rate", "taxRate", "gst_rate", "gstRate"], "tax_rate")?,
            description: take_string(
                map,
                &["description", "service_description", "serviceDescription", "notes"],
            ),
            terms_and_conditions: take_string(
                map,
                &["terms_and_conditions", "termsAndConditions"],
            ),
            due_date: take_string(map, &["due_date", "dueDate"]),
            lines: coerce_lines(map)?,
        })
    }
}

impl UpdateInvoiceInput {
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let map = as_object(value)?;
        Ok(UpdateInvoiceInput {
            subtotal: take_decimal(map, &["subtotal", "amount"], "subtotal")?,
            tax_rate: take_decimal(map, &["tax_rate", "taxRate", "gst_rate", "gstRate"], "tax_rate")?,
            paid_amount: take_decimal(map, &["paid_amount", "paidAmount"], "paid_amount")?,
            description: take_string(
                map,
                &["description", "service_description", "serviceDescription", "notes"],
            ),
            terms_and_conditions: take_string(
                map,
                &["terms_and_conditions", "termsAndConditions"],
            ),
            due_date: take_string(map, &["due_date", "dueDate"]),
            lifecycle_status: take_lifecycle(map),
        })
    }
}

impl SettingsUpdate {
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let map = as_object(value)?;
        Ok(SettingsUpdate {
            default_tax_rate: take_decimal(
                map,
                &["default_tax_rate", "defaultTaxRate", "gst_default_rate", "gstDefaultRate"],
                "default_tax_rate",
            )?,
            business_name: take_string(map, &["business_name", "businessName"]),
            business_address: take_string(map, &["business_address", "businessAddress"]),
            branding_ref: take_string(map, &["branding_ref", "brandingRef"]),
        })
    }
}

fn coerce_lines(map: &Map<String, Value>) -> CoreResult<Vec<LineInput>> {
    let raw = match lookup(map, &["lines", "items"]) {
        Some(Value::Array(items)) => items,
        Some(_) | None => return Ok(Vec::new()),
    };

    let mut lines = Vec::with_capacity(raw.len());
    for item in raw {
        let map = as_object(item)?;
        let description = take_string(map, &["description", "name"]).unwrap_or_default();
        let quantity = take_i64(map, &["quantity", "qty"], "line.quantity")?.unwrap_or(1);
        let unit_price = take_decimal(
            map,
            &["unit_price", "unitPrice", "rate", "price"],
            "line.unit_price",
        )?
        .ok_or(ValidationError::Required {
            field: "line.unit_price".to_string(),
        })?;
        lines.push(LineInput {
            description,
            quantity,
            unit_price,
        });
    }
    Ok(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_camel_and_snake_case_both_accepted() {
        let snake = CreateInvoiceInput::from_json(&json!({
            "customer_name": "Asha", "customer_phone": "9876543210",
            "amount": 100, "gst_rate": 18
        }))
        .unwrap();
        let camel = CreateInvoiceInput::from_json(&json!({
            "customerName": "Asha", "customerPhone": "9876543210",
            "subtotal": 100, "taxRate": 18
        }))
        .unwrap();

        assert_eq!(snake.customer_name, camel.customer_name);
        assert_eq!(snake.customer_mobile, camel.customer_mobile);
        assert_eq!(snake.subtotal, Some(dec("100")));
        assert_eq!(camel.tax_rate, Some(dec("18")));
    }

    #[test]
    fn test_numeric_as_string_coerced() {
        let input = UpdateInvoiceInput::from_json(&json!({
            "paid_amount": "118.00", "tax_rate": "18"
        }))
        .unwrap();
        assert_eq!(input.paid_amount, Some(dec("118.00")));
        assert_eq!(input.tax_rate, Some(dec("18")));
    }

    #[test]
    fn test_json_number_stays_exact() {
        // 33.335 must arrive as the exact decimal, not a float neighbour.
        let input = CreateInvoiceInput::from_json(&json!({ "subtotal": 33.335 })).unwrap();
        assert_eq!(input.subtotal, Some(dec("33.335")));
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let input = CreateInvoiceInput::from_json(&json!({
            "subtotal": 50,
            "frequent_flyer_id": "FF-123",
            "reverse_charge": true
        }))
        .unwrap();
        assert_eq!(input.subtotal, Some(dec("50")));
        // Nothing to assert against: the unknown keys simply have nowhere to
        // land in the canonical struct.
    }

    #[test]
    fn test_non_string_shapes_dropped_for_text_fields() {
        // Booleans, objects, and arrays never coerce into text fields.
        let input = CreateCustomerInput::from_json(&json!({
            "name": true,
            "email": { "value": "asha@example.com" },
            "city": ["Bengaluru"],
            "mobile": 9876543210i64
        }))
        .unwrap();
        assert_eq!(input.name, None);
        assert_eq!(input.email, None);
        assert_eq!(input.city, None);
        // Bare numbers still coerce: phones arrive unquoted from some callers.
        assert_eq!(input.mobile.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_is_active_boolean_still_maps_to_status() {
        let input = UpdateCustomerInput::from_json(&json!({ "is_active": false })).unwrap();
        assert_eq!(input.status, Some(CustomerStatus::Inactive));

        let input = UpdateCustomerInput::from_json(&json!({ "isActive": true })).unwrap();
        assert_eq!(input.status, Some(CustomerStatus::Active));
    }

    #[test]
    fn test_bad_decimal_rejected() {
        let err = UpdateInvoiceInput::from_json(&json!({ "paid_amount": "a lot" })).unwrap_err();
        assert!(err.to_string().contains("paid_amount"));
    }

    #[test]
    fn test_status_mapping() {
        let input = UpdateInvoiceInput::from_json(&json!({ "status": "cancelled" })).unwrap();
        assert_eq!(input.lifecycle_status, Some(LifecycleStatus::Cancelled));

        // Payment statuses are derived, never accepted as input.
        let input = UpdateInvoiceInput::from_json(&json!({ "status": "paid" })).unwrap();
        assert_eq!(input.lifecycle_status, None);
    }

    #[test]
    fn test_lines_coercion() {
        let input = CreateInvoiceInput::from_json(&json!({
            "items": [
                { "description": "Oil change", "qty": 2, "rate": "250.00" },
                { "description": "Filter", "unit_price": 99.50 }
            ]
        }))
        .unwrap();
        assert_eq!(input.lines.len(), 2);
        assert_eq!(input.lines[0].quantity, 2);
        assert_eq!(input.lines[0].unit_price, dec("250.00"));
        assert_eq!(input.lines[1].quantity, 1);
        assert_eq!(input.lines[1].unit_price, dec("99.50"));
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(CreateCustomerInput::from_json(&json!([1, 2, 3])).is_err());
    }
}
