//! Orders: customer details, frozen priced lines and lifecycle state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::AccessDenied;
use crate::item::{LineItem, MeasurementUnit};
use crate::pricing::OrderSummary;
use crate::store::StoreError;
use crate::types::{Email, OrderId, OrderStatus, UserId};

/// Errors raised by order operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Missing customer data, no valid items, unknown door style, etc.
    #[error("{0}")]
    Validation(String),

    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The actor is neither the owner nor an admin.
    #[error("you do not have access to this order")]
    Forbidden,

    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The operation does not apply in the order's current state.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<AccessDenied> for OrderError {
    fn from(_: AccessDenied) -> Self {
        Self::Forbidden
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Contact and shipping details of the ordering customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Customer {
    /// Trim every field and check the required ones are present.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` naming the first blank field.
    pub fn validated(self) -> Result<Self, OrderError> {
        let required = |value: String, field: &str| {
            let value = value.trim().to_owned();
            if value.is_empty() {
                Err(OrderError::Validation(format!("customer {field} is required")))
            } else {
                Ok(value)
            }
        };

        Ok(Self {
            name: required(self.name, "name")?,
            email: self.email,
            phone: required(self.phone, "phone")?,
            company: self
                .company
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
            address: required(self.address, "address")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            zip_code: required(self.zip_code, "zip code")?,
        })
    }
}

/// A line as submitted, with the area and price it was billed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: LineItem,
    pub area: Decimal,
    pub price: Decimal,
}

/// A persisted, status-tracked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// `None` for guest checkouts.
    pub owner_id: Option<UserId>,
    pub customer: Customer,
    pub items: Vec<OrderLine>,
    pub unit: MeasurementUnit,
    pub shipping_notes: Option<String>,
    pub payment_method: String,
    pub promo_code: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub summary: OrderSummary,
}

impl Order {
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self.status, OrderStatus::Draft)
    }

    /// Total number of doors across all lines.
    #[must_use]
    pub fn door_count(&self) -> i64 {
        self.items.iter().map(|l| i64::from(l.item.qty)).sum()
    }
}

/// Everything needed to create or replace an order's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub customer: Customer,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub unit: MeasurementUnit,
    #[serde(default)]
    pub shipping_notes: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// Checkout form data; the items come from the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    pub customer: Customer,
    #[serde(default)]
    pub shipping_notes: Option<String>,
    pub payment_method: String,
}

/// Partial update applied by [`crate::store::OrderStore::update_order`].
///
/// `id`, `owner_id` and `order_date` are immutable and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub customer: Option<Customer>,
    pub items: Option<Vec<OrderLine>>,
    pub unit: Option<MeasurementUnit>,
    pub shipping_notes: Option<Option<String>>,
    pub payment_method: Option<String>,
    pub promo_code: Option<Option<String>>,
    pub summary: Option<OrderSummary>,
}

impl OrderPatch {
    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to `order`.
    pub fn apply_to(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(customer) = self.customer {
            order.customer = customer;
        }
        if let Some(items) = self.items {
            order.items = items;
        }
        if let Some(unit) = self.unit {
            order.unit = unit;
        }
        if let Some(notes) = self.shipping_notes {
            order.shipping_notes = notes;
        }
        if let Some(method) = self.payment_method {
            order.payment_method = method;
        }
        if let Some(code) = self.promo_code {
            order.promo_code = code;
        }
        if let Some(summary) = self.summary {
            order.summary = summary;
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures {
    //! Sample customers for tests.

    use super::Customer;
    use crate::types::Email;

    /// A complete customer record.
    ///
    /// # Panics
    ///
    /// Never; the address is a valid literal.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn customer() -> Customer {
        Customer {
            name: "Dana Builder".into(),
            email: Email::parse("dana@example.com").unwrap(),
            phone: "555-0100".into(),
            company: Some("Builder Cabinets".into()),
            address: "12 Mill Road".into(),
            city: "Springfield".into(),
            state: "OR".into(),
            zip_code: "97477".into(),
        }
    }
}
