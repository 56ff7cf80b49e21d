//! Order repository.
//!
//! An order is a `customer_order` header plus its `order_line` rows. Writes
//! that touch both run in one transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use door_portal_core::catalog::FinishRef;
use door_portal_core::{
    Customer, Email, LineItem, LineItemId, MeasurementUnit, Order, OrderId, OrderLine,
    OrderPatch, OrderStatus, OrderStore, OrderSummary, StoreError, UserId,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: Option<i32>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_company: Option<String>,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    unit: MeasurementUnit,
    shipping_notes: Option<String>,
    payment_method: String,
    promo_code: Option<String>,
    order_date: DateTime<Utc>,
    status: OrderStatus,
    subtotal: Decimal,
    shipping: Decimal,
    discount: Decimal,
    total: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email on order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            owner_id: self.owner_id.map(UserId::new),
            customer: Customer {
                name: self.customer_name,
                email,
                phone: self.customer_phone,
                company: self.customer_company,
                address: self.address,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
            },
            items,
            unit: self.unit,
            shipping_notes: self.shipping_notes,
            payment_method: self.payment_method,
            promo_code: self.promo_code,
            order_date: self.order_date,
            status: self.status,
            summary: OrderSummary {
                subtotal: self.subtotal,
                shipping: self.shipping,
                discount: self.discount,
                total: self.total,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    qty: i32,
    width: Decimal,
    height: Decimal,
    door_style: String,
    finish_name: String,
    finish_manufacturer: String,
    glass: bool,
    glass_type: Option<String>,
    center_rail: bool,
    bore: bool,
    hinge: Option<String>,
    notes: Option<String>,
    area: Decimal,
    price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            item: LineItem {
                id: LineItemId::from_uuid(row.id),
                qty: row.qty,
                width: row.width,
                height: row.height,
                door_style: row.door_style,
                finish: FinishRef::new(row.finish_name, row.finish_manufacturer),
                glass: row.glass,
                glass_type: row.glass_type,
                center_rail: row.center_rail,
                bore: row.bore,
                hinge: row.hinge,
                notes: row.notes,
            },
            area: row.area,
            price: row.price,
        }
    }
}

const ORDER_COLUMNS: &str = r"
    id, owner_id, customer_name, customer_email, customer_phone, customer_company,
    address, city, state, zip_code, unit, shipping_notes, payment_method, promo_code,
    order_date, status, subtotal, shipping, discount, total
";

const LINE_COLUMNS: &str = r"
    id, order_id, qty, width, height, door_style, finish_name, finish_manufacturer,
    glass, glass_type, center_rail, bore, hinge, notes, area, price
";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the lines of `orders` and assemble full orders, keeping row order.
    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {LINE_COLUMNS}
             FROM portal.order_line
             WHERE order_id = ANY($1)
             ORDER BY order_id, position"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            lines.entry(row.order_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    async fn fetch_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM portal.customer_order WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM portal.order_line WHERE order_id = $1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;

        row.into_order(lines.into_iter().map(Into::into).collect())
            .map(Some)
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        lines: &[OrderLine],
    ) -> Result<(), RepositoryError> {
        for (position, line) in lines.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption("too many lines on one order".to_owned())
            })?;
            let item = &line.item;

            sqlx::query(
                r"
                INSERT INTO portal.order_line (
                    id, order_id, position, qty, width, height, door_style,
                    finish_name, finish_manufacturer, glass, glass_type,
                    center_rail, bore, hinge, notes, area, price
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                ",
            )
            .bind(item.id)
            .bind(order_id)
            .bind(position)
            .bind(item.qty)
            .bind(item.width)
            .bind(item.height)
            .bind(&item.door_style)
            .bind(&item.finish.name)
            .bind(&item.finish.manufacturer)
            .bind(item.glass)
            .bind(&item.glass_type)
            .bind(item.center_rail)
            .bind(item.bore)
            .bind(&item.hinge)
            .bind(&item.notes)
            .bind(line.area)
            .bind(line.price)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

impl OrderStore for PgOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    async fn create_order(&self, order: &Order) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        sqlx::query(
            r"
            INSERT INTO portal.customer_order (
                id, owner_id, customer_name, customer_email, customer_phone,
                customer_company, address, city, state, zip_code, unit,
                shipping_notes, payment_method, promo_code, order_date, status,
                subtotal, shipping, discount, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            ",
        )
        .bind(order.id)
        .bind(order.owner_id)
        .bind(&order.customer.name)
        .bind(order.customer.email.as_str())
        .bind(&order.customer.phone)
        .bind(&order.customer.company)
        .bind(&order.customer.address)
        .bind(&order.customer.city)
        .bind(&order.customer.state)
        .bind(&order.customer.zip_code)
        .bind(order.unit)
        .bind(&order.shipping_notes)
        .bind(&order.payment_method)
        .bind(&order.promo_code)
        .bind(order.order_date)
        .bind(order.status)
        .bind(order.summary.subtotal)
        .bind(order.summary.shipping)
        .bind(order.summary.discount)
        .bind(order.summary.total)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Self::insert_lines(&mut tx, order.id, &order.items).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(order.clone())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM portal.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.assemble(vec![row]).await?.pop())
    }

    #[instrument(skip(self), fields(owner_id = %owner))]
    async fn list_orders_by_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS}
             FROM portal.customer_order
             WHERE owner_id = $1
             ORDER BY order_date DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(self.assemble(rows).await?)
    }

    #[instrument(skip(self))]
    async fn list_all_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM portal.customer_order ORDER BY order_date DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(self.assemble(rows).await?)
    }

    #[instrument(skip(self, patch), fields(order_id = %id, status = ?patch.status))]
    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut order = Self::fetch_for_update(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let replaces_items = patch.items.is_some();
        patch.apply_to(&mut order);

        sqlx::query(
            r"
            UPDATE portal.customer_order
            SET customer_name = $2, customer_email = $3, customer_phone = $4,
                customer_company = $5, address = $6, city = $7, state = $8,
                zip_code = $9, unit = $10, shipping_notes = $11,
                payment_method = $12, promo_code = $13, status = $14,
                subtotal = $15, shipping = $16, discount = $17, total = $18
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&order.customer.name)
        .bind(order.customer.email.as_str())
        .bind(&order.customer.phone)
        .bind(&order.customer.company)
        .bind(&order.customer.address)
        .bind(&order.customer.city)
        .bind(&order.customer.state)
        .bind(&order.customer.zip_code)
        .bind(order.unit)
        .bind(&order.shipping_notes)
        .bind(&order.payment_method)
        .bind(&order.promo_code)
        .bind(order.status)
        .bind(order.summary.subtotal)
        .bind(order.summary.shipping)
        .bind(order.summary.discount)
        .bind(order.summary.total)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if replaces_items {
            sqlx::query("DELETE FROM portal.order_line WHERE order_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;
            Self::insert_lines(&mut tx, id, &order.items).await?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM portal.customer_order WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
