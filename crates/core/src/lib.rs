//! Door Portal core - domain library.
//!
//! This crate holds the domain of the cabinet-door ordering portal and is
//! shared by every other component:
//! - `portal` - HTTP service for customers and admins
//! - `cli` - Command-line tools for migrations, users and catalog seeding
//!
//! # Architecture
//!
//! The core crate does no I/O. Persistence and notifications are reached
//! through the traits in [`store`]; the portal implements them on
//! `PostgreSQL` and SMTP. This keeps pricing and lifecycle rules testable
//! without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, money and status enums
//! - [`catalog`] - Door styles, manufacturers, finishes, glass types
//! - [`item`] - Configured line items and measurement units
//! - [`pricing`] - The pricing engine: areas, rates, totals
//! - [`cart`] - Session cart and promo codes
//! - [`order`] - Orders, submissions and patches
//! - [`access`] - Owner-or-admin guard
//! - [`store`] - Catalog, order and notifier traits
//! - [`service`] - Catalog and order services over the store traits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod cart;
pub mod catalog;
pub mod item;
pub mod order;
pub mod pricing;
pub mod service;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use access::{AccessDenied, Actor, authorize, require_admin};
pub use cart::{Cart, CartError, CartTotals, PromoCodes};
pub use catalog::{CatalogError, CatalogSnapshot, FinishRef};
pub use item::{LineItem, LineItemInput, MeasurementUnit};
pub use order::{
    CheckoutDetails, Customer, Order, OrderError, OrderLine, OrderPatch, OrderSubmission,
};
pub use pricing::{OrderSummary, PricingEngine, PricingPolicy};
pub use service::{CatalogService, OrderService};
pub use store::{CatalogStore, Notifier, NotifyError, OrderStore, StoreError};
pub use types::*;
