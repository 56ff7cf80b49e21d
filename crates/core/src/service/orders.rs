//! Order lifecycle service.
//!
//! Creation, drafts, status changes, reads and deletion. Every operation on
//! an existing order loads it through [`OrderService::fetch_authorized`],
//! which runs the owner-or-admin guard.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::access::{Actor, authorize};
use crate::cart::{Cart, PromoCodes};
use crate::catalog::CatalogSnapshot;
use crate::item::{LineItem, MeasurementUnit, valid_items};
use crate::order::{
    CheckoutDetails, Customer, Order, OrderError, OrderLine, OrderPatch, OrderSubmission,
};
use crate::pricing::{OrderSummary, PricingEngine, PricingPolicy};
use crate::service::catalog::load_snapshot;
use crate::store::{CatalogStore, Notifier, OrderStore, StoreError};
use crate::types::{OrderId, OrderStatus};

/// Validated and priced order contents, ready to persist.
struct Priced {
    customer: Customer,
    lines: Vec<OrderLine>,
    unit: MeasurementUnit,
    shipping_notes: Option<String>,
    payment_method: String,
    promo_code: Option<String>,
    summary: OrderSummary,
}

impl Priced {
    fn into_patch(self, status: Option<OrderStatus>) -> OrderPatch {
        OrderPatch {
            status,
            customer: Some(self.customer),
            items: Some(self.lines),
            unit: Some(self.unit),
            shipping_notes: Some(self.shipping_notes),
            payment_method: Some(self.payment_method),
            promo_code: Some(self.promo_code),
            summary: Some(self.summary),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn missing_order(id: OrderId) -> impl FnOnce(StoreError) -> OrderError {
    move |err| match err {
        StoreError::NotFound => OrderError::NotFound(id),
        other => OrderError::Store(other),
    }
}

/// Reject items whose door style is unknown or no longer offered.
fn check_door_styles(catalog: &CatalogSnapshot, items: &[LineItem]) -> Result<(), OrderError> {
    match items
        .iter()
        .find(|item| !catalog.is_door_style_available(&item.door_style))
    {
        Some(item) => Err(OrderError::Validation(format!(
            "door style '{}' is not available",
            item.door_style
        ))),
        None => Ok(()),
    }
}

/// Order operations.
pub struct OrderService<'a, O, C, N> {
    orders: &'a O,
    catalog: &'a C,
    notifier: &'a N,
    policy: &'a PricingPolicy,
    promos: &'a PromoCodes,
}

impl<'a, O, C, N> OrderService<'a, O, C, N>
where
    O: OrderStore,
    C: CatalogStore,
    N: Notifier,
{
    #[must_use]
    pub const fn new(
        orders: &'a O,
        catalog: &'a C,
        notifier: &'a N,
        policy: &'a PricingPolicy,
        promos: &'a PromoCodes,
    ) -> Self {
        Self {
            orders,
            catalog,
            notifier,
            policy,
            promos,
        }
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    async fn snapshot(&self) -> Result<CatalogSnapshot, OrderError> {
        Ok(load_snapshot(self.catalog).await?)
    }

    /// Freeze the prices of `items` against `catalog`.
    ///
    /// `items` must already be filtered to valid rows.
    fn price_lines(
        &self,
        catalog: &CatalogSnapshot,
        items: Vec<LineItem>,
        unit: MeasurementUnit,
        promo_code: Option<&str>,
    ) -> (Vec<OrderLine>, OrderSummary, Option<String>) {
        let (promo_code, percent) = promo_code
            .and_then(|code| self.promos.lookup(code))
            .map_or((None, Decimal::ZERO), |(code, pct)| (Some(code), pct));

        let engine = PricingEngine::from_snapshot(catalog, self.policy);
        let priced = engine.price_items(&items, unit, percent);
        let lines = items
            .into_iter()
            .zip(priced.lines)
            .map(|(item, line)| OrderLine {
                item,
                area: line.area,
                price: line.price,
            })
            .collect();

        (lines, priced.summary, promo_code)
    }

    /// Validate a submission and price it against the live catalog.
    async fn prepare(&self, submission: OrderSubmission) -> Result<Priced, OrderError> {
        let customer = submission.customer.validated()?;
        let payment_method = submission.payment_method.trim().to_owned();
        if payment_method.is_empty() {
            return Err(OrderError::Validation("payment method is required".into()));
        }

        let items = valid_items(submission.items);
        if items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one valid item".into(),
            ));
        }

        let catalog = self.snapshot().await?;
        check_door_styles(&catalog, &items)?;

        let (lines, summary, promo_code) = self.price_lines(
            &catalog,
            items,
            submission.unit,
            submission.promo_code.as_deref(),
        );

        Ok(Priced {
            customer,
            lines,
            unit: submission.unit,
            shipping_notes: blank_to_none(submission.shipping_notes),
            payment_method,
            promo_code,
            summary,
        })
    }

    async fn insert(&self, actor: &Actor, priced: Priced, status: OrderStatus) -> Result<Order, OrderError> {
        let order = Order {
            id: OrderId::generate(),
            owner_id: actor.user_id,
            customer: priced.customer,
            items: priced.lines,
            unit: priced.unit,
            shipping_notes: priced.shipping_notes,
            payment_method: priced.payment_method,
            promo_code: priced.promo_code,
            order_date: Utc::now(),
            status,
            summary: priced.summary,
        };
        Ok(self.orders.create_order(&order).await?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn notify_created(&self, order: &Order) {
        if let Err(e) = self.notifier.notify_order_created(order).await {
            tracing::warn!(order_id = %order.id, error = %e, "Order confirmation not sent");
        }
    }

    async fn notify_status_changed(&self, order: &Order, previous: OrderStatus) {
        if let Err(e) = self.notifier.notify_status_changed(order, previous).await {
            tracing::warn!(order_id = %order.id, error = %e, "Status change notification not sent");
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Load an order the actor may see.
    ///
    /// A missing order is `NotFound` for admins and `Forbidden` for everyone
    /// else, so non-admins cannot probe for order ids.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` or `Store`.
    pub async fn fetch_authorized(&self, actor: &Actor, id: OrderId) -> Result<Order, OrderError> {
        let Some(order) = self.orders.get_order(id).await? else {
            return Err(if actor.is_admin() {
                OrderError::NotFound(id)
            } else {
                OrderError::Forbidden
            });
        };
        authorize(actor, order.owner_id)?;
        Ok(order)
    }

    async fn fetch_draft(&self, actor: &Actor, id: OrderId) -> Result<Order, OrderError> {
        let order = self.fetch_authorized(actor, id).await?;
        if !order.is_draft() {
            return Err(OrderError::Conflict(format!(
                "order {id} has been submitted and can no longer be edited"
            )));
        }
        Ok(order)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Submit a new order in `Processing`.
    ///
    /// Invalid rows are dropped; at least one valid row must remain. The
    /// order and its lines are persisted in a single store call. The
    /// confirmation notification is best-effort.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for missing customer data, no valid items or an
    /// unavailable door style, and `Store` if persisting fails.
    #[instrument(skip(self, submission), fields(actor_id = ?actor.user_id, order_id))]
    pub async fn create(&self, actor: &Actor, submission: OrderSubmission) -> Result<Order, OrderError> {
        let priced = self.prepare(submission).await?;
        let order = self.insert(actor, priced, OrderStatus::Processing).await?;
        tracing::Span::current().record("order_id", tracing::field::display(order.id));
        tracing::info!(
            total = %order.summary.total,
            lines = order.items.len(),
            "Order created"
        );
        self.notify_created(&order).await;
        Ok(order)
    }

    /// Turn a cart into an order. The caller clears the cart on success.
    ///
    /// # Errors
    ///
    /// As [`Self::create`].
    pub async fn checkout(
        &self,
        actor: &Actor,
        cart: &Cart,
        details: CheckoutDetails,
    ) -> Result<Order, OrderError> {
        let submission = OrderSubmission {
            customer: details.customer,
            items: cart.items().to_vec(),
            unit: cart.unit(),
            shipping_notes: details.shipping_notes,
            payment_method: details.payment_method,
            promo_code: cart.promo_code().map(str::to_owned),
        };
        self.create(actor, submission).await
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Save an unsubmitted order for later. Signed-in users only.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for guests, otherwise as [`Self::create`].
    #[instrument(skip(self, submission), fields(actor_id = ?actor.user_id))]
    pub async fn save_draft(&self, actor: &Actor, submission: OrderSubmission) -> Result<Order, OrderError> {
        if actor.user_id.is_none() {
            return Err(OrderError::Forbidden);
        }
        let priced = self.prepare(submission).await?;
        let order = self.insert(actor, priced, OrderStatus::Draft).await?;
        tracing::info!(order_id = %order.id, "Draft saved");
        Ok(order)
    }

    /// Replace a draft's contents and reprice it.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the order is no longer a draft, otherwise as
    /// [`Self::create`] and [`Self::fetch_authorized`].
    #[instrument(skip(self, submission), fields(actor_id = ?actor.user_id))]
    pub async fn update_draft(
        &self,
        actor: &Actor,
        id: OrderId,
        submission: OrderSubmission,
    ) -> Result<Order, OrderError> {
        self.fetch_draft(actor, id).await?;
        let priced = self.prepare(submission).await?;
        self.orders
            .update_order(id, priced.into_patch(None))
            .await
            .map_err(missing_order(id))
    }

    /// Submit a draft: revalidate, reprice against the live catalog, move to
    /// `Processing` and send the confirmation.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the order is not a draft and `Validation` if
    /// its items no longer pass.
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn submit_draft(&self, actor: &Actor, id: OrderId) -> Result<Order, OrderError> {
        let draft = self.fetch_draft(actor, id).await?;

        let items: Vec<LineItem> = draft
            .items
            .into_iter()
            .map(|line| line.item)
            .filter(LineItem::is_valid)
            .collect();
        if items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one valid item".into(),
            ));
        }

        let catalog = self.snapshot().await?;
        check_door_styles(&catalog, &items)?;
        let (lines, summary, promo_code) =
            self.price_lines(&catalog, items, draft.unit, draft.promo_code.as_deref());

        let patch = OrderPatch {
            status: Some(OrderStatus::Processing),
            items: Some(lines),
            promo_code: Some(promo_code),
            summary: Some(summary),
            ..OrderPatch::default()
        };
        let order = self
            .orders
            .update_order(id, patch)
            .await
            .map_err(missing_order(id))?;
        tracing::info!(order_id = %id, total = %order.summary.total, "Draft submitted");
        self.notify_created(&order).await;
        Ok(order)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Move an order to `status`.
    ///
    /// Setting the current status again returns the order unchanged without
    /// notifying. `Draft → Processing` goes through [`Self::submit_draft`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for a change the lifecycle does not
    /// allow, otherwise as [`Self::fetch_authorized`].
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self.fetch_authorized(actor, id).await?;
        let previous = order.status;

        if previous == status {
            return Ok(order);
        }
        if !previous.can_transition_to(status) {
            return Err(OrderError::InvalidTransition {
                from: previous,
                to: status,
            });
        }
        if previous == OrderStatus::Draft && status == OrderStatus::Processing {
            return self.submit_draft(actor, id).await;
        }

        let order = self
            .orders
            .update_order(id, OrderPatch::status(status))
            .await
            .map_err(missing_order(id))?;
        tracing::info!(order_id = %id, from = %previous, to = %status, "Order status changed");
        self.notify_status_changed(&order, previous).await;
        Ok(order)
    }

    // =========================================================================
    // Reads and deletion
    // =========================================================================

    /// # Errors
    ///
    /// As [`Self::fetch_authorized`].
    pub async fn get(&self, actor: &Actor, id: OrderId) -> Result<Order, OrderError> {
        self.fetch_authorized(actor, id).await
    }

    /// The actor's own orders, or every order for admins. Newest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for guests and `Store` if the store fails.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Order>, OrderError> {
        let mut orders = if actor.is_admin() {
            self.orders.list_all_orders().await?
        } else {
            let owner = actor.user_id.ok_or(OrderError::Forbidden)?;
            self.orders.list_orders_by_owner(owner).await?
        };
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    /// Hard delete. Admins may delete any order; owners only their drafts.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for anyone else, otherwise as
    /// [`Self::fetch_authorized`].
    #[instrument(skip(self), fields(actor_id = ?actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: OrderId) -> Result<(), OrderError> {
        let order = self.fetch_authorized(actor, id).await?;
        if !actor.is_admin() && !order.is_draft() {
            return Err(OrderError::Forbidden);
        }
        self.orders
            .delete_order(id)
            .await
            .map_err(missing_order(id))?;
        tracing::info!(order_id = %id, status = %order.status, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{DoorStyle, Finish, GlassType, Manufacturer};
    use crate::item::fixtures::{door, glass_door};
    use crate::memory::{MemoryCatalogStore, MemoryOrderStore, RecordingNotifier};
    use crate::order::fixtures::customer;
    use crate::types::{DoorStyleId, FinishId, GlassTypeId, ManufacturerId, UserId, round_cents};

    struct Harness {
        orders: MemoryOrderStore,
        catalog: MemoryCatalogStore,
        notifier: RecordingNotifier,
        policy: PricingPolicy,
        promos: PromoCodes,
    }

    impl Harness {
        fn new() -> Self {
            let catalog = MemoryCatalogStore::with_snapshot(CatalogSnapshot {
                door_styles: vec![
                    DoorStyle {
                        id: DoorStyleId::new(1),
                        name: "Shaker".into(),
                        available: true,
                    },
                    DoorStyle {
                        id: DoorStyleId::new(2),
                        name: "Cathedral".into(),
                        available: false,
                    },
                ],
                manufacturers: vec![Manufacturer {
                    id: ManufacturerId::new(1),
                    name: "Acme".into(),
                }],
                finishes: vec![Finish {
                    id: FinishId::new(1),
                    name: "White".into(),
                    manufacturer_id: ManufacturerId::new(1),
                    manufacturer: "Acme".into(),
                    sqft_price: Decimal::new(1250, 2),
                }],
                glass_types: vec![GlassType {
                    id: GlassTypeId::new(1),
                    name: "Clear".into(),
                    sqft_price: Decimal::from(15),
                    sqft_minimum: Decimal::ONE,
                }],
            });
            Self {
                orders: MemoryOrderStore::default(),
                catalog,
                notifier: RecordingNotifier::default(),
                policy: PricingPolicy::default(),
                promos: PromoCodes::new().with_code("SAVE10", Decimal::TEN),
            }
        }

        fn service(&self) -> OrderService<'_, MemoryOrderStore, MemoryCatalogStore, RecordingNotifier> {
            OrderService::new(
                &self.orders,
                &self.catalog,
                &self.notifier,
                &self.policy,
                &self.promos,
            )
        }
    }

    fn submission(items: Vec<LineItem>) -> OrderSubmission {
        OrderSubmission {
            customer: customer(),
            items,
            unit: MeasurementUnit::Inches,
            shipping_notes: Some("  ".into()),
            payment_method: "invoice".into(),
            promo_code: None,
        }
    }

    const OWNER: UserId = UserId::new(10);

    #[tokio::test]
    async fn test_create_prices_and_notifies() {
        let h = Harness::new();
        let order = h
            .service()
            .create(&Actor::user(OWNER), submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.owner_id, Some(OWNER));
        assert_eq!(order.shipping_notes, None);
        assert_eq!(round_cents(order.items[0].price), Decimal::new(12_500, 2));
        assert_eq!(order.summary.shipping, Decimal::new(1599, 2));
        assert_eq!(h.notifier.created(), vec![order.id]);
        assert_eq!(h.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_item_list() {
        let h = Harness::new();
        let result = h
            .service()
            .create(&Actor::user(OWNER), submission(vec![door(0, 30, 1)]))
            .await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
        assert_eq!(h.orders.len(), 0);
        assert!(h.notifier.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_filters_invalid_rows() {
        let h = Harness::new();
        let order = h
            .service()
            .create(
                &Actor::user(OWNER),
                submission(vec![door(24, 30, 2), door(0, 0, 1), door(24, 30, 0)]),
            )
            .await
            .unwrap();
        assert_eq!(order.items.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_unavailable_door_style() {
        let h = Harness::new();
        let mut item = door(24, 30, 1);
        item.door_style = "Cathedral".into();
        let result = h
            .service()
            .create(&Actor::user(OWNER), submission(vec![item]))
            .await;
        assert!(matches!(result, Err(OrderError::Validation(msg)) if msg.contains("Cathedral")));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_creation() {
        let h = Harness::new();
        h.notifier.fail(true);
        let order = h
            .service()
            .create(&Actor::guest(), submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();
        assert_eq!(order.owner_id, None);
        assert_eq!(h.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_applies_cart_promo_and_glass() {
        let h = Harness::new();
        let mut cart = Cart::new();
        cart.add(vec![glass_door(24, 30, 2, "Clear")]).unwrap();
        cart.apply_promo("save10", &h.promos);

        let details = CheckoutDetails {
            customer: customer(),
            shipping_notes: Some("Leave at dock 3".into()),
            payment_method: "net30".into(),
        };
        let order = h
            .service()
            .checkout(&Actor::user(OWNER), &cart, details)
            .await
            .unwrap();

        let summary = order.summary.rounded();
        assert_eq!(summary.subtotal, Decimal::from(275));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.discount, Decimal::new(2750, 2));
        assert_eq!(summary.total, Decimal::new(24_750, 2));
        assert_eq!(order.promo_code.as_deref(), Some("SAVE10"));
    }

    #[tokio::test]
    async fn test_status_change_rejected_for_non_owner_for_every_status() {
        let h = Harness::new();
        let service = h.service();
        let order = service
            .create(&Actor::user(OWNER), submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();

        for status in OrderStatus::ALL {
            for actor in [Actor::user(UserId::new(11)), Actor::guest()] {
                let result = service.update_status(&actor, order.id, status).await;
                assert_eq!(result, Err(OrderError::Forbidden), "{status}");
            }
        }
        assert!(h.notifier.status_changes().is_empty());
    }

    #[tokio::test]
    async fn test_owner_and_admin_walk_the_lifecycle() {
        let h = Harness::new();
        let service = h.service();
        let admin = Actor::admin(UserId::new(1));
        let order = service
            .create(&Actor::user(OWNER), submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();

        let held = service
            .update_status(&Actor::user(OWNER), order.id, OrderStatus::OnHold)
            .await
            .unwrap();
        assert_eq!(held.status, OrderStatus::OnHold);

        for status in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
            service.update_status(&admin, order.id, status).await.unwrap();
        }

        let result = service
            .update_status(&admin, order.id, OrderStatus::Processing)
            .await;
        assert_eq!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Processing
            })
        );

        let changes = h.notifier.status_changes();
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0], (order.id, OrderStatus::Processing, OrderStatus::OnHold));
    }

    #[tokio::test]
    async fn test_same_status_is_silent_no_op() {
        let h = Harness::new();
        let service = h.service();
        let order = service
            .create(&Actor::user(OWNER), submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();
        let same = service
            .update_status(&Actor::user(OWNER), order.id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(same, order);
        assert!(h.notifier.status_changes().is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_hides_existence_from_non_admins() {
        let h = Harness::new();
        let service = h.service();
        let id = OrderId::generate();
        assert_eq!(
            service.get(&Actor::user(OWNER), id).await,
            Err(OrderError::Forbidden)
        );
        assert_eq!(
            service.get(&Actor::admin(UserId::new(1)), id).await,
            Err(OrderError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_draft_lifecycle() {
        let h = Harness::new();
        let service = h.service();
        let owner = Actor::user(OWNER);

        let draft = service
            .save_draft(&owner, submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();
        assert_eq!(draft.status, OrderStatus::Draft);
        assert!(h.notifier.created().is_empty());

        let updated = service
            .update_draft(&owner, draft.id, submission(vec![door(24, 30, 4)]))
            .await
            .unwrap();
        assert_eq!(round_cents(updated.summary.subtotal), Decimal::from(250));
        assert_eq!(updated.order_date, draft.order_date);

        h.catalog.set_finish_price(FinishId::new(1), Decimal::from(20));
        let submitted = service.submit_draft(&owner, draft.id).await.unwrap();
        assert_eq!(submitted.status, OrderStatus::Processing);
        assert_eq!(round_cents(submitted.summary.subtotal), Decimal::from(400));
        assert_eq!(h.notifier.created(), vec![draft.id]);

        let again = service
            .update_draft(&owner, draft.id, submission(vec![door(12, 12, 1)]))
            .await;
        assert!(matches!(again, Err(OrderError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_guests_cannot_save_drafts() {
        let h = Harness::new();
        let result = h
            .service()
            .save_draft(&Actor::guest(), submission(vec![door(24, 30, 2)]))
            .await;
        assert_eq!(result, Err(OrderError::Forbidden));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let h = Harness::new();
        let service = h.service();
        let owner = Actor::user(OWNER);

        let draft = service
            .save_draft(&owner, submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();
        service.delete(&owner, draft.id).await.unwrap();

        let order = service
            .create(&owner, submission(vec![door(24, 30, 2)]))
            .await
            .unwrap();
        assert_eq!(service.delete(&owner, order.id).await, Err(OrderError::Forbidden));
        service
            .delete(&Actor::admin(UserId::new(1)), order.id)
            .await
            .unwrap();
        assert_eq!(h.orders.len(), 0);
    }

    #[tokio::test]
    async fn test_list_for_scopes_to_owner() {
        let h = Harness::new();
        let service = h.service();
        for owner in [OWNER, OWNER, UserId::new(11)] {
            service
                .create(&Actor::user(owner), submission(vec![door(24, 30, 1)]))
                .await
                .unwrap();
        }

        let mine = service.list_for(&Actor::user(OWNER)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.windows(2).all(|w| w[0].order_date >= w[1].order_date));

        let all = service.list_for(&Actor::admin(UserId::new(1))).await.unwrap();
        assert_eq!(all.len(), 3);

        assert_eq!(
            service.list_for(&Actor::guest()).await,
            Err(OrderError::Forbidden)
        );
    }
}
