//! Application services.
//!
//! Services borrow their stores and configuration for the duration of a
//! request and hold no state of their own.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogService, load_snapshot};
pub use orders::OrderService;
