//! In-memory stores and a recording notifier for tests.
//!
//! Enabled by the `test-util` feature. Rules match the `PostgreSQL` stores:
//! unique names per entity, unique `(name, manufacturer)` finishes, and
//! manufacturers cannot be deleted while finishes reference them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;

use crate::catalog::{
    CatalogSnapshot, DoorStyle, Finish, GlassType, Manufacturer, NewDoorStyle, NewFinish,
    NewGlassType, NewManufacturer,
};
use crate::order::{Order, OrderPatch};
use crate::store::{CatalogStore, Notifier, NotifyError, OrderStore, StoreError};
use crate::types::{
    DoorStyleId, FinishId, GlassTypeId, ManufacturerId, OrderId, OrderStatus, UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".into()))
}

fn conflict(entity: &str, name: &str) -> StoreError {
    StoreError::Conflict(format!("{entity} '{name}' already exists"))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Default)]
struct CatalogTables {
    snapshot: CatalogSnapshot,
    next_id: i32,
}

impl CatalogTables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn manufacturer_name(&self, id: ManufacturerId) -> Result<String, StoreError> {
        self.snapshot
            .manufacturers
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.clone())
            .ok_or_else(|| StoreError::Conflict(format!("manufacturer {id} does not exist")))
    }

    fn finish_taken(&self, input: &NewFinish, except: Option<FinishId>) -> bool {
        self.snapshot.finishes.iter().any(|f| {
            Some(f.id) != except && f.name == input.name && f.manufacturer_id == input.manufacturer_id
        })
    }
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: Mutex<CatalogTables>,
}

impl MemoryCatalogStore {
    /// Start from a prepared catalog. New ids continue after the largest
    /// id present.
    #[must_use]
    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        let next_id = snapshot
            .door_styles
            .iter()
            .map(|s| s.id.as_i32())
            .chain(snapshot.manufacturers.iter().map(|m| m.id.as_i32()))
            .chain(snapshot.finishes.iter().map(|f| f.id.as_i32()))
            .chain(snapshot.glass_types.iter().map(|g| g.id.as_i32()))
            .max()
            .unwrap_or(0);
        Self {
            tables: Mutex::new(CatalogTables { snapshot, next_id }),
        }
    }

    /// Change a finish price directly, as an admin edit would.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[allow(clippy::unwrap_used)]
    pub fn set_finish_price(&self, id: FinishId, price: Decimal) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(finish) = tables.snapshot.finishes.iter_mut().find(|f| f.id == id) {
            finish.sqft_price = price;
        }
    }
}

impl CatalogStore for MemoryCatalogStore {
    async fn list_door_styles(&self) -> Result<Vec<DoorStyle>, StoreError> {
        Ok(lock(&self.tables)?.snapshot.door_styles.clone())
    }

    async fn create_door_style(&self, input: &NewDoorStyle) -> Result<DoorStyle, StoreError> {
        let mut tables = lock(&self.tables)?;
        if tables.snapshot.door_styles.iter().any(|s| s.name == input.name) {
            return Err(conflict("door style", &input.name));
        }
        let style = DoorStyle {
            id: DoorStyleId::new(tables.next_id()),
            name: input.name.clone(),
            available: input.available,
        };
        tables.snapshot.door_styles.push(style.clone());
        Ok(style)
    }

    async fn update_door_style(
        &self,
        id: DoorStyleId,
        input: &NewDoorStyle,
    ) -> Result<DoorStyle, StoreError> {
        let mut tables = lock(&self.tables)?;
        let styles = &mut tables.snapshot.door_styles;
        if styles.iter().any(|s| s.id != id && s.name == input.name) {
            return Err(conflict("door style", &input.name));
        }
        let style = styles
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        style.name.clone_from(&input.name);
        style.available = input.available;
        Ok(style.clone())
    }

    async fn delete_door_style(&self, id: DoorStyleId) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let styles = &mut tables.snapshot.door_styles;
        let before = styles.len();
        styles.retain(|s| s.id != id);
        if styles.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, StoreError> {
        Ok(lock(&self.tables)?.snapshot.manufacturers.clone())
    }

    async fn create_manufacturer(&self, input: &NewManufacturer) -> Result<Manufacturer, StoreError> {
        let mut tables = lock(&self.tables)?;
        if tables.snapshot.manufacturers.iter().any(|m| m.name == input.name) {
            return Err(conflict("manufacturer", &input.name));
        }
        let manufacturer = Manufacturer {
            id: ManufacturerId::new(tables.next_id()),
            name: input.name.clone(),
        };
        tables.snapshot.manufacturers.push(manufacturer.clone());
        Ok(manufacturer)
    }

    async fn update_manufacturer(
        &self,
        id: ManufacturerId,
        input: &NewManufacturer,
    ) -> Result<Manufacturer, StoreError> {
        let mut tables = lock(&self.tables)?;
        let snapshot = &mut tables.snapshot;
        if snapshot.manufacturers.iter().any(|m| m.id != id && m.name == input.name) {
            return Err(conflict("manufacturer", &input.name));
        }
        let manufacturer = snapshot
            .manufacturers
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound)?;
        manufacturer.name.clone_from(&input.name);
        let updated = manufacturer.clone();
        for finish in snapshot.finishes.iter_mut().filter(|f| f.manufacturer_id == id) {
            finish.manufacturer.clone_from(&input.name);
        }
        Ok(updated)
    }

    async fn delete_manufacturer(&self, id: ManufacturerId) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let snapshot = &mut tables.snapshot;
        if snapshot.finishes.iter().any(|f| f.manufacturer_id == id) {
            return Err(StoreError::Conflict(format!(
                "manufacturer {id} still has finishes"
            )));
        }
        let before = snapshot.manufacturers.len();
        snapshot.manufacturers.retain(|m| m.id != id);
        if snapshot.manufacturers.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_finishes(&self) -> Result<Vec<Finish>, StoreError> {
        Ok(lock(&self.tables)?.snapshot.finishes.clone())
    }

    async fn create_finish(&self, input: &NewFinish) -> Result<Finish, StoreError> {
        let mut tables = lock(&self.tables)?;
        let manufacturer = tables.manufacturer_name(input.manufacturer_id)?;
        if tables.finish_taken(input, None) {
            return Err(conflict("finish", &format!("{} ({manufacturer})", input.name)));
        }
        let finish = Finish {
            id: FinishId::new(tables.next_id()),
            name: input.name.clone(),
            manufacturer_id: input.manufacturer_id,
            manufacturer,
            sqft_price: input.sqft_price,
        };
        tables.snapshot.finishes.push(finish.clone());
        Ok(finish)
    }

    async fn update_finish(&self, id: FinishId, input: &NewFinish) -> Result<Finish, StoreError> {
        let mut tables = lock(&self.tables)?;
        let manufacturer = tables.manufacturer_name(input.manufacturer_id)?;
        if tables.finish_taken(input, Some(id)) {
            return Err(conflict("finish", &format!("{} ({manufacturer})", input.name)));
        }
        let finish = tables
            .snapshot
            .finishes
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::NotFound)?;
        finish.name.clone_from(&input.name);
        finish.manufacturer_id = input.manufacturer_id;
        finish.manufacturer = manufacturer;
        finish.sqft_price = input.sqft_price;
        Ok(finish.clone())
    }

    async fn delete_finish(&self, id: FinishId) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let finishes = &mut tables.snapshot.finishes;
        let before = finishes.len();
        finishes.retain(|f| f.id != id);
        if finishes.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_glass_types(&self) -> Result<Vec<GlassType>, StoreError> {
        Ok(lock(&self.tables)?.snapshot.glass_types.clone())
    }

    async fn create_glass_type(&self, input: &NewGlassType) -> Result<GlassType, StoreError> {
        let mut tables = lock(&self.tables)?;
        if tables.snapshot.glass_types.iter().any(|g| g.name == input.name) {
            return Err(conflict("glass type", &input.name));
        }
        let glass = GlassType {
            id: GlassTypeId::new(tables.next_id()),
            name: input.name.clone(),
            sqft_price: input.sqft_price,
            sqft_minimum: input.sqft_minimum,
        };
        tables.snapshot.glass_types.push(glass.clone());
        Ok(glass)
    }

    async fn update_glass_type(
        &self,
        id: GlassTypeId,
        input: &NewGlassType,
    ) -> Result<GlassType, StoreError> {
        let mut tables = lock(&self.tables)?;
        let glass_types = &mut tables.snapshot.glass_types;
        if glass_types.iter().any(|g| g.id != id && g.name == input.name) {
            return Err(conflict("glass type", &input.name));
        }
        let glass = glass_types
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::NotFound)?;
        glass.name.clone_from(&input.name);
        glass.sqft_price = input.sqft_price;
        glass.sqft_minimum = input.sqft_minimum;
        Ok(glass.clone())
    }

    async fn delete_glass_type(&self, id: GlassTypeId) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let glass_types = &mut tables.snapshot.glass_types;
        let before = glass_types.len();
        glass_types.retain(|g| g.id != id);
        if glass_types.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Orders held in memory, keyed by id.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    /// Number of stored orders, or zero if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.lock().map_or(0, |orders| orders.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, order: &Order) -> Result<Order, StoreError> {
        let mut orders = lock(&self.orders)?;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(lock(&self.orders)?.get(&id).cloned())
    }

    async fn list_orders_by_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        Ok(lock(&self.orders)?
            .values()
            .filter(|o| o.owner_id == Some(owner))
            .cloned()
            .collect())
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(lock(&self.orders)?.values().cloned().collect())
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        let mut orders = lock(&self.orders)?;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply_to(order);
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        lock(&self.orders)?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

// =============================================================================
// Notifier
// =============================================================================

#[derive(Debug, Default)]
struct Sent {
    created: Vec<OrderId>,
    status_changes: Vec<(OrderId, OrderStatus, OrderStatus)>,
    failing: bool,
}

/// Records notifications instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Sent>,
}

impl RecordingNotifier {
    /// Make every later notification fail with a delivery error.
    pub fn fail(&self, failing: bool) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.failing = failing;
        }
    }

    /// Ids of orders that got a confirmation, in order.
    #[must_use]
    pub fn created(&self) -> Vec<OrderId> {
        self.sent.lock().map(|s| s.created.clone()).unwrap_or_default()
    }

    /// `(order, previous, new)` for every status notification, in order.
    #[must_use]
    pub fn status_changes(&self) -> Vec<(OrderId, OrderStatus, OrderStatus)> {
        self.sent
            .lock()
            .map(|s| s.status_changes.clone())
            .unwrap_or_default()
    }

    fn record(&self, f: impl FnOnce(&mut Sent)) -> Result<(), NotifyError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotifyError::Delivery("notifier lock poisoned".into()))?;
        if sent.failing {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        f(&mut sent);
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    async fn notify_order_created(&self, order: &Order) -> Result<(), NotifyError> {
        self.record(|sent| sent.created.push(order.id))
    }

    async fn notify_status_changed(
        &self,
        order: &Order,
        previous: OrderStatus,
    ) -> Result<(), NotifyError> {
        self.record(|sent| {
            sent.status_changes.push((order.id, previous, order.status));
        })
    }
}
