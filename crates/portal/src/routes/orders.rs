//! Order route handlers.
//!
//! Handlers only translate HTTP to the core order service. The service runs
//! the owner-or-admin check on every existing order it loads.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use door_portal_core::{
    Customer, LineItem, LineItemInput, MeasurementUnit, Order, OrderId, OrderStatus,
    OrderSubmission,
};

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Order or draft contents sent by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer: Customer,
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub unit: MeasurementUnit,
    #[serde(default)]
    pub shipping_notes: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl From<OrderRequest> for OrderSubmission {
    fn from(req: OrderRequest) -> Self {
        Self {
            customer: req.customer,
            items: req.items.into_iter().map(LineItem::from).collect(),
            unit: req.unit,
            shipping_notes: req.shipping_notes,
            payment_method: req.payment_method,
            promo_code: req.promo_code,
        }
    }
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// The caller's orders, or every order for admins. Newest first.
///
/// # Errors
///
/// Returns 500 if the store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_for(&user.actor()).await?))
}

/// Submit an order without going through the cart.
///
/// # Errors
///
/// Returns 400 for missing customer data, no valid items or an unavailable
/// door style.
#[instrument(skip(state, auth, body))]
pub async fn create(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Json(body): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().create(&auth.actor(), body.into()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// One order.
///
/// # Errors
///
/// Returns 404 if the order does not exist and 403 if the caller is neither
/// its owner nor an admin.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().get(&auth.actor(), id).await?))
}

/// Change an order's status.
///
/// # Errors
///
/// Returns 400 for a transition the lifecycle does not allow, 403 and 404
/// as for [`show`].
#[instrument(skip(state, user, body), fields(user_id = %user.id, status = %body.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>> {
    Ok(Json(
        state
            .orders()
            .update_status(&user.actor(), id, body.status)
            .await?,
    ))
}

/// Save a draft for later.
///
/// # Errors
///
/// Returns 400 as for [`create`].
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_draft(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().save_draft(&user.actor(), body.into()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Replace a draft's contents.
///
/// # Errors
///
/// Returns 409 if the order is no longer a draft.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_draft(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<OrderRequest>,
) -> Result<Json<Order>> {
    Ok(Json(
        state
            .orders()
            .update_draft(&user.actor(), id, body.into())
            .await?,
    ))
}

/// Submit a draft, repricing it against the current catalog.
///
/// # Errors
///
/// Returns 409 if the order is not a draft and 400 if its items no longer
/// pass validation.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn submit_draft(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().submit_draft(&user.actor(), id).await?))
}

/// Delete an order.
///
/// # Errors
///
/// Returns 403 unless the caller is an admin or owns the draft.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    state.orders().delete(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
