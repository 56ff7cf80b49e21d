//! Catalog service: reads for the ordering flow, admin-gated writes.

use tracing::instrument;

use crate::access::{Actor, require_admin};
use crate::catalog::{
    CatalogError, CatalogSnapshot, DoorStyle, DoorStyleInput, Finish, FinishInput, GlassType,
    GlassTypeInput, Manufacturer, ManufacturerInput, NewFinish,
};
use crate::store::{CatalogStore, StoreError};
use crate::types::{DoorStyleId, FinishId, GlassTypeId, ManufacturerId};

/// Read every catalog table once.
///
/// # Errors
///
/// Returns the first store failure.
pub async fn load_snapshot<C: CatalogStore>(store: &C) -> Result<CatalogSnapshot, StoreError> {
    Ok(CatalogSnapshot {
        door_styles: store.list_door_styles().await?,
        manufacturers: store.list_manufacturers().await?,
        finishes: store.list_finishes().await?,
        glass_types: store.list_glass_types().await?,
    })
}

/// Map a store failure on a write to the catalog taxonomy.
fn write_error(entity: &'static str, id: Option<i32>) -> impl FnOnce(StoreError) -> CatalogError {
    move |err| match (err, id) {
        (StoreError::NotFound, Some(id)) => CatalogError::NotFound { entity, id },
        (StoreError::Conflict(msg), _) => CatalogError::Conflict(msg),
        (other, _) => CatalogError::Store(other),
    }
}

/// Catalog operations.
pub struct CatalogService<'a, C> {
    store: &'a C,
}

impl<'a, C: CatalogStore> CatalogService<'a, C> {
    #[must_use]
    pub const fn new(store: &'a C) -> Self {
        Self { store }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        load_snapshot(self.store).await.map_err(CatalogError::Store)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn door_styles(&self) -> Result<Vec<DoorStyle>, CatalogError> {
        self.store
            .list_door_styles()
            .await
            .map_err(CatalogError::Store)
    }

    /// Door styles offered on the order form.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn available_door_styles(&self) -> Result<Vec<DoorStyle>, CatalogError> {
        let mut styles = self.door_styles().await?;
        styles.retain(|s| s.available);
        Ok(styles)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn manufacturers(&self) -> Result<Vec<Manufacturer>, CatalogError> {
        self.store
            .list_manufacturers()
            .await
            .map_err(CatalogError::Store)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn finishes(&self) -> Result<Vec<Finish>, CatalogError> {
        self.store.list_finishes().await.map_err(CatalogError::Store)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn glass_types(&self) -> Result<Vec<GlassType>, CatalogError> {
        self.store
            .list_glass_types()
            .await
            .map_err(CatalogError::Store)
    }

    // =========================================================================
    // Door styles
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `Validation` for a blank name and
    /// `Conflict` for a duplicate name.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn create_door_style(
        &self,
        actor: &Actor,
        input: &DoorStyleInput,
    ) -> Result<DoorStyle, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        let style = self
            .store
            .create_door_style(&input)
            .await
            .map_err(write_error("door style", None))?;
        tracing::info!(door_style_id = %style.id, name = %style.name, "Door style created");
        Ok(style)
    }

    /// # Errors
    ///
    /// As [`Self::create_door_style`], plus `NotFound`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn update_door_style(
        &self,
        actor: &Actor,
        id: DoorStyleId,
        input: &DoorStyleInput,
    ) -> Result<DoorStyle, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        self.store
            .update_door_style(id, &input)
            .await
            .map_err(write_error("door style", Some(id.as_i32())))
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins and `NotFound` for a missing style.
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn delete_door_style(&self, actor: &Actor, id: DoorStyleId) -> Result<(), CatalogError> {
        require_admin(actor)?;
        self.store
            .delete_door_style(id)
            .await
            .map_err(write_error("door style", Some(id.as_i32())))?;
        tracing::info!(door_style_id = %id, "Door style deleted");
        Ok(())
    }

    // =========================================================================
    // Manufacturers
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation` or `Conflict`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn create_manufacturer(
        &self,
        actor: &Actor,
        input: &ManufacturerInput,
    ) -> Result<Manufacturer, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        self.store
            .create_manufacturer(&input)
            .await
            .map_err(write_error("manufacturer", None))
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation`, `NotFound` or `Conflict`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn update_manufacturer(
        &self,
        actor: &Actor,
        id: ManufacturerId,
        input: &ManufacturerInput,
    ) -> Result<Manufacturer, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        self.store
            .update_manufacturer(id, &input)
            .await
            .map_err(write_error("manufacturer", Some(id.as_i32())))
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, `NotFound`, or `Conflict` while finishes still
    /// reference the manufacturer.
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn delete_manufacturer(
        &self,
        actor: &Actor,
        id: ManufacturerId,
    ) -> Result<(), CatalogError> {
        require_admin(actor)?;
        self.store
            .delete_manufacturer(id)
            .await
            .map_err(write_error("manufacturer", Some(id.as_i32())))
    }

    // =========================================================================
    // Finishes
    // =========================================================================

    async fn validate_finish(&self, input: &FinishInput) -> Result<NewFinish, CatalogError> {
        let input = input.validate()?;
        let exists = self
            .manufacturers()
            .await?
            .iter()
            .any(|m| m.id == input.manufacturer_id);
        if !exists {
            return Err(CatalogError::Validation(format!(
                "manufacturer {} does not exist",
                input.manufacturer_id
            )));
        }
        Ok(input)
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation` (including an unknown manufacturer)
    /// or `Conflict` for a duplicate `(name, manufacturer)`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn create_finish(
        &self,
        actor: &Actor,
        input: &FinishInput,
    ) -> Result<Finish, CatalogError> {
        require_admin(actor)?;
        let input = self.validate_finish(input).await?;
        let finish = self
            .store
            .create_finish(&input)
            .await
            .map_err(write_error("finish", None))?;
        tracing::info!(
            finish_id = %finish.id,
            name = %finish.name,
            manufacturer = %finish.manufacturer,
            "Finish created"
        );
        Ok(finish)
    }

    /// # Errors
    ///
    /// As [`Self::create_finish`], plus `NotFound`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn update_finish(
        &self,
        actor: &Actor,
        id: FinishId,
        input: &FinishInput,
    ) -> Result<Finish, CatalogError> {
        require_admin(actor)?;
        let input = self.validate_finish(input).await?;
        let finish = self
            .store
            .update_finish(id, &input)
            .await
            .map_err(write_error("finish", Some(id.as_i32())))?;
        tracing::info!(finish_id = %id, price = %finish.sqft_price, "Finish updated");
        Ok(finish)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn delete_finish(&self, actor: &Actor, id: FinishId) -> Result<(), CatalogError> {
        require_admin(actor)?;
        self.store
            .delete_finish(id)
            .await
            .map_err(write_error("finish", Some(id.as_i32())))
    }

    // =========================================================================
    // Glass types
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation` or `Conflict`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn create_glass_type(
        &self,
        actor: &Actor,
        input: &GlassTypeInput,
    ) -> Result<GlassType, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        self.store
            .create_glass_type(&input)
            .await
            .map_err(write_error("glass type", None))
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation`, `NotFound` or `Conflict`.
    #[instrument(skip(self, input), fields(actor_id = ?actor.user_id))]
    pub async fn update_glass_type(
        &self,
        actor: &Actor,
        id: GlassTypeId,
        input: &GlassTypeInput,
    ) -> Result<GlassType, CatalogError> {
        require_admin(actor)?;
        let input = input.validate()?;
        self.store
            .update_glass_type(id, &input)
            .await
            .map_err(write_error("glass type", Some(id.as_i32())))
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn delete_glass_type(&self, actor: &Actor, id: GlassTypeId) -> Result<(), CatalogError> {
        require_admin(actor)?;
        self.store
            .delete_glass_type(id)
            .await
            .map_err(write_error("glass type", Some(id.as_i32())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::memory::MemoryCatalogStore;
    use crate::types::UserId;

    fn admin() -> Actor {
        Actor::admin(UserId::new(1))
    }

    #[tokio::test]
    async fn test_writes_require_admin() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        let input = DoorStyleInput {
            name: "Shaker".into(),
            available: true,
        };
        let result = service
            .create_door_style(&Actor::user(UserId::new(2)), &input)
            .await;
        assert_eq!(result, Err(CatalogError::Forbidden));
        assert!(service.door_styles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_requires_existing_manufacturer() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        let input = FinishInput {
            name: "White".into(),
            manufacturer_id: Some(ManufacturerId::new(99)),
            sqft_price: Decimal::TEN,
        };
        let result = service.create_finish(&admin(), &input).await;
        assert!(matches!(result, Err(CatalogError::Validation(msg)) if msg.contains("99")));
    }

    #[tokio::test]
    async fn test_same_finish_name_under_two_manufacturers() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        let acme = service
            .create_manufacturer(&admin(), &ManufacturerInput { name: "Acme".into() })
            .await
            .unwrap();
        let birch = service
            .create_manufacturer(&admin(), &ManufacturerInput { name: "Birch".into() })
            .await
            .unwrap();

        for (manufacturer, price) in [(acme.id, 10), (birch.id, 20)] {
            service
                .create_finish(
                    &admin(),
                    &FinishInput {
                        name: "White".into(),
                        manufacturer_id: Some(manufacturer),
                        sqft_price: Decimal::from(price),
                    },
                )
                .await
                .unwrap();
        }

        let duplicate = service
            .create_finish(
                &admin(),
                &FinishInput {
                    name: "White".into(),
                    manufacturer_id: Some(acme.id),
                    sqft_price: Decimal::ONE,
                },
            )
            .await;
        assert!(matches!(duplicate, Err(CatalogError::Conflict(_))));
        assert_eq!(service.finishes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_not_found() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        let result = service
            .update_glass_type(
                &admin(),
                GlassTypeId::new(5),
                &GlassTypeInput {
                    name: "Clear".into(),
                    sqft_price: Decimal::TEN,
                    sqft_minimum: Decimal::ONE,
                },
            )
            .await;
        assert_eq!(
            result,
            Err(CatalogError::NotFound {
                entity: "glass type",
                id: 5
            })
        );
    }

    #[tokio::test]
    async fn test_available_door_styles_hides_unavailable() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        for (name, available) in [("Shaker", true), ("Cathedral", false)] {
            service
                .create_door_style(
                    &admin(),
                    &DoorStyleInput {
                        name: name.into(),
                        available,
                    },
                )
                .await
                .unwrap();
        }
        let styles = service.available_door_styles().await.unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].name, "Shaker");
    }

    #[tokio::test]
    async fn test_manufacturer_in_use_cannot_be_deleted() {
        let store = MemoryCatalogStore::default();
        let service = CatalogService::new(&store);
        let acme = service
            .create_manufacturer(&admin(), &ManufacturerInput { name: "Acme".into() })
            .await
            .unwrap();
        service
            .create_finish(
                &admin(),
                &FinishInput {
                    name: "White".into(),
                    manufacturer_id: Some(acme.id),
                    sqft_price: Decimal::TEN,
                },
            )
            .await
            .unwrap();
        let result = service.delete_manufacturer(&admin(), acme.id).await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }
}
