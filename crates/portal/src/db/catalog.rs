//! Catalog repository: door styles, manufacturers, finishes and glass types.
//!
//! Finishes are always read joined with their manufacturer so the name can
//! be matched against line items; renaming a manufacturer therefore renames
//! every finish reference with no extra writes.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use door_portal_core::catalog::{
    DoorStyle, Finish, GlassType, Manufacturer, NewDoorStyle, NewFinish, NewGlassType,
    NewManufacturer,
};
use door_portal_core::{
    CatalogStore, DoorStyleId, FinishId, GlassTypeId, ManufacturerId, StoreError,
};

use super::{RepositoryError, map_constraint_error};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DoorStyleRow {
    id: i32,
    name: String,
    available: bool,
}

impl From<DoorStyleRow> for DoorStyle {
    fn from(row: DoorStyleRow) -> Self {
        Self {
            id: DoorStyleId::new(row.id),
            name: row.name,
            available: row.available,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ManufacturerRow {
    id: i32,
    name: String,
}

impl From<ManufacturerRow> for Manufacturer {
    fn from(row: ManufacturerRow) -> Self {
        Self {
            id: ManufacturerId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FinishRow {
    id: i32,
    name: String,
    manufacturer_id: i32,
    manufacturer: String,
    sqft_price: Decimal,
}

impl From<FinishRow> for Finish {
    fn from(row: FinishRow) -> Self {
        Self {
            id: FinishId::new(row.id),
            name: row.name,
            manufacturer_id: ManufacturerId::new(row.manufacturer_id),
            manufacturer: row.manufacturer,
            sqft_price: row.sqft_price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GlassTypeRow {
    id: i32,
    name: String,
    sqft_price: Decimal,
    sqft_minimum: Decimal,
}

impl From<GlassTypeRow> for GlassType {
    fn from(row: GlassTypeRow) -> Self {
        Self {
            id: GlassTypeId::new(row.id),
            name: row.name,
            sqft_price: row.sqft_price,
            sqft_minimum: row.sqft_minimum,
        }
    }
}

const FINISH_COLUMNS: &str = r"
    f.id, f.name, f.manufacturer_id, m.name AS manufacturer, f.sqft_price
";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`CatalogStore`].
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn finish_by_id(&self, id: i32) -> Result<Finish, RepositoryError> {
        let row = sqlx::query_as::<_, FinishRow>(&format!(
            "SELECT {FINISH_COLUMNS}
             FROM portal.finish f
             JOIN portal.manufacturer m ON m.id = f.manufacturer_id
             WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }
}

/// Turn a `rows_affected` count into `NotFound` when nothing matched.
const fn require_affected(rows: u64) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

impl CatalogStore for PgCatalogStore {
    // =========================================================================
    // Door styles
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_door_styles(&self) -> Result<Vec<DoorStyle>, StoreError> {
        let rows = sqlx::query_as::<_, DoorStyleRow>(
            r"
            SELECT id, name, available
            FROM portal.door_style
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_door_style(&self, input: &NewDoorStyle) -> Result<DoorStyle, StoreError> {
        let row = sqlx::query_as::<_, DoorStyleRow>(
            r"
            INSERT INTO portal.door_style (name, available)
            VALUES ($1, $2)
            RETURNING id, name, available
            ",
        )
        .bind(&input.name)
        .bind(input.available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a door style with this name already exists", ""))?;
        Ok(row.into())
    }

    #[instrument(skip(self, input), fields(door_style_id = %id))]
    async fn update_door_style(
        &self,
        id: DoorStyleId,
        input: &NewDoorStyle,
    ) -> Result<DoorStyle, StoreError> {
        let row = sqlx::query_as::<_, DoorStyleRow>(
            r"
            UPDATE portal.door_style
            SET name = $2, available = $3
            WHERE id = $1
            RETURNING id, name, available
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.available)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a door style with this name already exists", ""))?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(door_style_id = %id))]
    async fn delete_door_style(&self, id: DoorStyleId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM portal.door_style WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(require_affected(result.rows_affected())?)
    }

    // =========================================================================
    // Manufacturers
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, StoreError> {
        let rows = sqlx::query_as::<_, ManufacturerRow>(
            "SELECT id, name FROM portal.manufacturer ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_manufacturer(
        &self,
        input: &NewManufacturer,
    ) -> Result<Manufacturer, StoreError> {
        let row = sqlx::query_as::<_, ManufacturerRow>(
            r"
            INSERT INTO portal.manufacturer (name)
            VALUES ($1)
            RETURNING id, name
            ",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a manufacturer with this name already exists", ""))?;
        Ok(row.into())
    }

    #[instrument(skip(self, input), fields(manufacturer_id = %id))]
    async fn update_manufacturer(
        &self,
        id: ManufacturerId,
        input: &NewManufacturer,
    ) -> Result<Manufacturer, StoreError> {
        let row = sqlx::query_as::<_, ManufacturerRow>(
            r"
            UPDATE portal.manufacturer
            SET name = $2
            WHERE id = $1
            RETURNING id, name
            ",
        )
        .bind(id)
        .bind(&input.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a manufacturer with this name already exists", ""))?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(manufacturer_id = %id))]
    async fn delete_manufacturer(&self, id: ManufacturerId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM portal.manufacturer WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(e, "", "manufacturer still has finishes; delete them first")
            })?;
        Ok(require_affected(result.rows_affected())?)
    }

    // =========================================================================
    // Finishes
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_finishes(&self) -> Result<Vec<Finish>, StoreError> {
        let rows = sqlx::query_as::<_, FinishRow>(&format!(
            "SELECT {FINISH_COLUMNS}
             FROM portal.finish f
             JOIN portal.manufacturer m ON m.id = f.manufacturer_id
             ORDER BY m.name, f.name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name, manufacturer_id = %input.manufacturer_id))]
    async fn create_finish(&self, input: &NewFinish) -> Result<Finish, StoreError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO portal.finish (name, manufacturer_id, sqft_price)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(input.manufacturer_id)
        .bind(input.sqft_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                "this manufacturer already offers a finish with this name",
                "manufacturer does not exist",
            )
        })?;
        Ok(self.finish_by_id(id).await?)
    }

    #[instrument(skip(self, input), fields(finish_id = %id))]
    async fn update_finish(&self, id: FinishId, input: &NewFinish) -> Result<Finish, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE portal.finish
            SET name = $2, manufacturer_id = $3, sqft_price = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.manufacturer_id)
        .bind(input.sqft_price)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                "this manufacturer already offers a finish with this name",
                "manufacturer does not exist",
            )
        })?;
        require_affected(result.rows_affected())?;
        Ok(self.finish_by_id(id.as_i32()).await?)
    }

    #[instrument(skip(self), fields(finish_id = %id))]
    async fn delete_finish(&self, id: FinishId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM portal.finish WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(require_affected(result.rows_affected())?)
    }

    // =========================================================================
    // Glass types
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_glass_types(&self) -> Result<Vec<GlassType>, StoreError> {
        let rows = sqlx::query_as::<_, GlassTypeRow>(
            r"
            SELECT id, name, sqft_price, sqft_minimum
            FROM portal.glass_type
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_glass_type(&self, input: &NewGlassType) -> Result<GlassType, StoreError> {
        let row = sqlx::query_as::<_, GlassTypeRow>(
            r"
            INSERT INTO portal.glass_type (name, sqft_price, sqft_minimum)
            VALUES ($1, $2, $3)
            RETURNING id, name, sqft_price, sqft_minimum
            ",
        )
        .bind(&input.name)
        .bind(input.sqft_price)
        .bind(input.sqft_minimum)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a glass type with this name already exists", ""))?;
        Ok(row.into())
    }

    #[instrument(skip(self, input), fields(glass_type_id = %id))]
    async fn update_glass_type(
        &self,
        id: GlassTypeId,
        input: &NewGlassType,
    ) -> Result<GlassType, StoreError> {
        let row = sqlx::query_as::<_, GlassTypeRow>(
            r"
            UPDATE portal.glass_type
            SET name = $2, sqft_price = $3, sqft_minimum = $4
            WHERE id = $1
            RETURNING id, name, sqft_price, sqft_minimum
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.sqft_price)
        .bind(input.sqft_minimum)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "a glass type with this name already exists", ""))?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(glass_type_id = %id))]
    async fn delete_glass_type(&self, id: GlassTypeId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM portal.glass_type WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(require_affected(result.rows_affected())?)
    }
}
