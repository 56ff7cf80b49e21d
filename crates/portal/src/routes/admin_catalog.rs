//! Admin catalog writes.
//!
//! Every handler requires the admin role through [`RequireAdmin`]. The core
//! catalog service checks the role again before touching the store.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use door_portal_core::catalog::{
    DoorStyle, DoorStyleInput, Finish, FinishInput, GlassType, GlassTypeInput, Manufacturer,
    ManufacturerInput,
};
use door_portal_core::{DoorStyleId, FinishId, GlassTypeId, ManufacturerId};

use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

// =============================================================================
// Door styles
// =============================================================================

/// # Errors
///
/// Returns 400 for a blank name and 409 for a duplicate.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_door_style(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<DoorStyleInput>,
) -> Result<(StatusCode, Json<DoorStyle>)> {
    let style = state
        .catalog()
        .create_door_style(&admin.actor(), &input)
        .await?;
    add_breadcrumb("catalog", "Created door style", Some(&[("name", style.name.as_str())]));
    Ok((StatusCode::CREATED, Json(style)))
}

/// # Errors
///
/// Returns 404 for an unknown id, 400 or 409 as for creation.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_door_style(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DoorStyleId>,
    Json(input): Json<DoorStyleInput>,
) -> Result<Json<DoorStyle>> {
    Ok(Json(
        state
            .catalog()
            .update_door_style(&admin.actor(), id, &input)
            .await?,
    ))
}

/// # Errors
///
/// Returns 404 for an unknown id.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_door_style(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DoorStyleId>,
) -> Result<StatusCode> {
    state.catalog().delete_door_style(&admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Manufacturers
// =============================================================================

/// # Errors
///
/// Returns 400 for a blank name and 409 for a duplicate.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_manufacturer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ManufacturerInput>,
) -> Result<(StatusCode, Json<Manufacturer>)> {
    let manufacturer = state
        .catalog()
        .create_manufacturer(&admin.actor(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

/// # Errors
///
/// Returns 404 for an unknown id, 400 or 409 as for creation.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_manufacturer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ManufacturerId>,
    Json(input): Json<ManufacturerInput>,
) -> Result<Json<Manufacturer>> {
    Ok(Json(
        state
            .catalog()
            .update_manufacturer(&admin.actor(), id, &input)
            .await?,
    ))
}

/// # Errors
///
/// Returns 404 for an unknown id and 409 while finishes still reference it.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_manufacturer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ManufacturerId>,
) -> Result<StatusCode> {
    state
        .catalog()
        .delete_manufacturer(&admin.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Finishes
// =============================================================================

/// # Errors
///
/// Returns 400 for missing fields or an unknown manufacturer, 409 for a
/// duplicate `(name, manufacturer)`.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_finish(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<FinishInput>,
) -> Result<(StatusCode, Json<Finish>)> {
    let finish = state.catalog().create_finish(&admin.actor(), &input).await?;
    add_breadcrumb(
        "catalog",
        "Created finish",
        Some(&[("name", finish.name.as_str()), ("manufacturer", finish.manufacturer.as_str())]),
    );
    Ok((StatusCode::CREATED, Json(finish)))
}

/// # Errors
///
/// Returns 404 for an unknown id, 400 or 409 as for creation.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_finish(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<FinishId>,
    Json(input): Json<FinishInput>,
) -> Result<Json<Finish>> {
    Ok(Json(
        state
            .catalog()
            .update_finish(&admin.actor(), id, &input)
            .await?,
    ))
}

/// # Errors
///
/// Returns 404 for an unknown id.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_finish(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<FinishId>,
) -> Result<StatusCode> {
    state.catalog().delete_finish(&admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Glass types
// =============================================================================

/// # Errors
///
/// Returns 400 for a blank name or negative rates, 409 for a duplicate.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_glass_type(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<GlassTypeInput>,
) -> Result<(StatusCode, Json<GlassType>)> {
    let glass_type = state
        .catalog()
        .create_glass_type(&admin.actor(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(glass_type)))
}

/// # Errors
///
/// Returns 404 for an unknown id, 400 or 409 as for creation.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_glass_type(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<GlassTypeId>,
    Json(input): Json<GlassTypeInput>,
) -> Result<Json<GlassType>> {
    Ok(Json(
        state
            .catalog()
            .update_glass_type(&admin.actor(), id, &input)
            .await?,
    ))
}

/// # Errors
///
/// Returns 404 for an unknown id.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_glass_type(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<GlassTypeId>,
) -> Result<StatusCode> {
    state.catalog().delete_glass_type(&admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
