//! Cart route handlers.
//!
//! The cart lives in the session under [`keys::CART`]. It stores configured
//! items only; every response reprices them against the live catalog.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use door_portal_core::{
    Cart, CartTotals, CheckoutDetails, LineItem, LineItemId, LineItemInput, MeasurementUnit, Order,
    OrderId, PricingEngine,
};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::models::session::keys;
use crate::state::AppState;

/// Cart contents with freshly computed totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: Cart,
    pub totals: CartTotals,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<LineItemInput>,
}

/// Quantity change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub qty: i32,
}

/// Promo code request body.
#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    pub code: String,
}

/// Cart settings request body.
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub unit: MeasurementUnit,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session, or an empty one.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the cart in the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// Price the cart against the current catalog.
async fn respond(state: &AppState, cart: Cart) -> Result<Json<CartResponse>> {
    let catalog = state.catalog().snapshot().await?;
    let engine = PricingEngine::from_snapshot(&catalog, state.pricing());
    let totals = cart.display_totals(&engine, state.promo_codes());
    Ok(Json(CartResponse { cart, totals }))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
///
/// # Errors
///
/// Returns 500 if the session or catalog cannot be read.
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    respond(&state, cart).await
}

/// Add configured items. Rows without positive dimensions and quantity are
/// dropped.
///
/// # Errors
///
/// Returns 400 if no submitted row is valid.
#[instrument(skip(state, session, body), fields(rows = body.items.len()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemsRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    let added = cart.add(body.items.into_iter().map(LineItem::from))?;
    save_cart(&session, &cart).await?;

    tracing::debug!(added, "Items added to cart");
    let count = added.to_string();
    add_breadcrumb("cart", "Added items", Some(&[("count", count.as_str())]));
    respond(&state, cart).await
}

/// Change the quantity of one line. Quantities below 1 are ignored.
///
/// # Errors
///
/// Returns 404 if the cart has no such line.
#[instrument(skip(state, session, body), fields(qty = body.qty))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<LineItemId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(id, body.qty)?;
    save_cart(&session, &cart).await?;
    respond(&state, cart).await
}

/// Remove one line.
///
/// # Errors
///
/// Returns 404 if the cart has no such line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<LineItemId>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(id)?;
    save_cart(&session, &cart).await?;
    respond(&state, cart).await
}

/// Empty the cart, including any promo code.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    respond(&state, cart).await
}

/// Apply a promo code. Unknown codes leave the cart unchanged.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip_all)]
pub async fn apply_promo(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<PromoRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    if cart.apply_promo(&body.code, state.promo_codes()).is_some() {
        save_cart(&session, &cart).await?;
    } else {
        tracing::debug!(code = %body.code, "Unknown promo code ignored");
    }
    respond(&state, cart).await
}

/// Change the measurement unit used to interpret item dimensions.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn settings(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SettingsRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.set_unit(body.unit);
    save_cart(&session, &cart).await?;
    respond(&state, cart).await
}

/// Submit the cart as an order. The cart is emptied only on success.
///
/// # Errors
///
/// Returns 400 for an empty cart, missing customer data or an unavailable
/// door style.
#[instrument(skip(state, session, auth, details))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Json(details): Json<CheckoutDetails>,
) -> Result<(StatusCode, Json<Order>)> {
    let mut cart = load_cart(&session).await?;
    let order = state
        .orders()
        .checkout(&auth.actor(), &cart, details)
        .await?;

    let cart_cleared = clear_after_checkout(&session, &mut cart, order.id).await;

    let order_id = order.id.to_string();
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[
            ("order_id", order_id.as_str()),
            ("cart_cleared", if cart_cleared { "true" } else { "false" }),
        ]),
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Empty the session cart once its order exists. The order stands either
/// way, so a session failure is logged rather than returned.
async fn clear_after_checkout(session: &Session, cart: &mut Cart, order_id: OrderId) -> bool {
    cart.clear();
    match save_cart(session, cart).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(order_id = %order_id, error = %e, "Order placed but cart not cleared");
            false
        }
    }
}
