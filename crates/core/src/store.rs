//! Persistence and notification boundaries.
//!
//! The services in [`crate::service`] are generic over these traits. The
//! portal implements them on `PostgreSQL` and SMTP; the `test-util` feature
//! provides in-memory versions.

use std::future::Future;

use thiserror::Error;

use crate::catalog::{
    DoorStyle, Finish, GlassType, Manufacturer, NewDoorStyle, NewFinish, NewGlassType,
    NewManufacturer,
};
use crate::order::{Order, OrderPatch};
use crate::types::{
    DoorStyleId, FinishId, GlassTypeId, ManufacturerId, OrderId, OrderStatus, UserId,
};

/// Failure reported by a store implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed (connection, query, corrupt row).
    #[error("store error: {0}")]
    Backend(String),

    /// The record to update or delete does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness or reference constraint was violated.
    #[error("{0}")]
    Conflict(String),
}

/// Catalog read/write interface.
///
/// Writes receive inputs that have already been validated. Implementations
/// enforce name uniqueness (and `(name, manufacturer)` for finishes) and
/// report violations as [`StoreError::Conflict`].
pub trait CatalogStore: Send + Sync {
    fn list_door_styles(&self)
    -> impl Future<Output = Result<Vec<DoorStyle>, StoreError>> + Send;

    fn create_door_style(
        &self,
        input: &NewDoorStyle,
    ) -> impl Future<Output = Result<DoorStyle, StoreError>> + Send;

    fn update_door_style(
        &self,
        id: DoorStyleId,
        input: &NewDoorStyle,
    ) -> impl Future<Output = Result<DoorStyle, StoreError>> + Send;

    fn delete_door_style(
        &self,
        id: DoorStyleId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_manufacturers(
        &self,
    ) -> impl Future<Output = Result<Vec<Manufacturer>, StoreError>> + Send;

    fn create_manufacturer(
        &self,
        input: &NewManufacturer,
    ) -> impl Future<Output = Result<Manufacturer, StoreError>> + Send;

    fn update_manufacturer(
        &self,
        id: ManufacturerId,
        input: &NewManufacturer,
    ) -> impl Future<Output = Result<Manufacturer, StoreError>> + Send;

    /// Fails with [`StoreError::Conflict`] while finishes reference it.
    fn delete_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Finishes with their manufacturer name resolved.
    fn list_finishes(&self) -> impl Future<Output = Result<Vec<Finish>, StoreError>> + Send;

    fn create_finish(
        &self,
        input: &NewFinish,
    ) -> impl Future<Output = Result<Finish, StoreError>> + Send;

    fn update_finish(
        &self,
        id: FinishId,
        input: &NewFinish,
    ) -> impl Future<Output = Result<Finish, StoreError>> + Send;

    fn delete_finish(&self, id: FinishId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_glass_types(
        &self,
    ) -> impl Future<Output = Result<Vec<GlassType>, StoreError>> + Send;

    fn create_glass_type(
        &self,
        input: &NewGlassType,
    ) -> impl Future<Output = Result<GlassType, StoreError>> + Send;

    fn update_glass_type(
        &self,
        id: GlassTypeId,
        input: &NewGlassType,
    ) -> impl Future<Output = Result<GlassType, StoreError>> + Send;

    fn delete_glass_type(
        &self,
        id: GlassTypeId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Order persistence interface.
///
/// `create_order` must be atomic: either the order and all of its lines are
/// stored, or nothing is.
pub trait OrderStore: Send + Sync {
    fn create_order(&self, order: &Order) -> impl Future<Output = Result<Order, StoreError>> + Send;

    fn get_order(&self, id: OrderId)
    -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    fn list_orders_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    fn list_all_orders(&self) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Apply `patch` and return the updated order, or
    /// [`StoreError::NotFound`].
    fn update_order(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> impl Future<Output = Result<Order, StoreError>> + Send;

    /// Hard delete, or [`StoreError::NotFound`].
    fn delete_order(&self, id: OrderId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Notification delivery failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("failed to render notification: {0}")]
    Render(String),

    #[error("failed to deliver notification: {0}")]
    Delivery(String),
}

/// Order notifications.
///
/// Delivery is best-effort: callers log failures and carry on.
pub trait Notifier: Send + Sync {
    fn notify_order_created(
        &self,
        order: &Order,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    fn notify_status_changed(
        &self,
        order: &Order,
        previous: OrderStatus,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
