//! Public catalog reads.

use axum::{Json, extract::State};

use door_portal_core::catalog::{DoorStyle, Finish, GlassType, Manufacturer};
use door_portal_core::CatalogSnapshot;

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Everything the configurator needs in one response.
///
/// # Errors
///
/// Returns 500 if the catalog cannot be loaded.
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<CatalogSnapshot>> {
    Ok(Json(state.catalog().snapshot().await?))
}

/// Door styles. Admins also see styles that are no longer offered.
///
/// # Errors
///
/// Returns 500 if the catalog cannot be loaded.
pub async fn door_styles(
    State(state): State<AppState>,
    auth: OptionalAuth,
) -> Result<Json<Vec<DoorStyle>>> {
    let catalog = state.catalog();
    let styles = if auth.actor().is_admin() {
        catalog.door_styles().await?
    } else {
        catalog.available_door_styles().await?
    };
    Ok(Json(styles))
}

/// # Errors
///
/// Returns 500 if the catalog cannot be loaded.
pub async fn manufacturers(State(state): State<AppState>) -> Result<Json<Vec<Manufacturer>>> {
    Ok(Json(state.catalog().manufacturers().await?))
}

/// # Errors
///
/// Returns 500 if the catalog cannot be loaded.
pub async fn finishes(State(state): State<AppState>) -> Result<Json<Vec<Finish>>> {
    Ok(Json(state.catalog().finishes().await?))
}

/// # Errors
///
/// Returns 500 if the catalog cannot be loaded.
pub async fn glass_types(State(state): State<AppState>) -> Result<Json<Vec<GlassType>>> {
    Ok(Json(state.catalog().glass_types().await?))
}
