//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin
//! dp-cli user create -e admin@example.com -n "Admin Name" -r admin --password '...'
//!
//! # Reset a password
//! dp-cli user password -e admin@example.com --password '...'
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use door_portal::services::{AuthError, AuthService};
use door_portal_core::UserRole;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: user, admin")]
    InvalidRole(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No user with this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a new user with a password.
///
/// # Errors
///
/// Returns an error for an unknown role, an invalid email or password, a
/// duplicate email, or a database failure.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Parse and validate role before touching the database
    let role: UserRole = role
        .parse()
        .map_err(|_| UserCommandError::InvalidRole(role.to_owned()))?;

    let pool = super::connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);
    let user = AuthService::new(&pool)
        .create_user(email, name, role, password)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => UserCommandError::UserExists(email.to_owned()),
            other => UserCommandError::Auth(other),
        })?;

    tracing::info!(user_id = %user.id, "User created successfully");
    Ok(())
}

/// Replace a user's password.
///
/// # Errors
///
/// Returns an error for an unknown email, a weak password, or a database
/// failure.
pub async fn set_password(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool)
        .set_password(email, password)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => UserCommandError::UserNotFound(email.to_owned()),
            other => UserCommandError::Auth(other),
        })?;

    tracing::info!(user_id = %user.id, "Password updated");
    Ok(())
}
