//! Authentication route handlers.
//!
//! Password login against the portal's own user table. The session stores a
//! [`CurrentUser`]; the session id is cycled on login.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log in with email and password.
///
/// # Errors
///
/// Returns 401 for unknown emails and wrong passwords alike.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = state.auth().login(&body.email, &body.password).await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Logged in", None);

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(user))
}

/// Log out. Succeeds for guests too.
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user's account.
///
/// # Errors
///
/// Returns 401 if the account was removed after login.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    Ok(Json(state.auth().get_user(current.id).await?))
}
