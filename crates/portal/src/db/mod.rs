//! Database operations for the portal `PostgreSQL`.
//!
//! # Schema: `portal`
//!
//! ## Tables
//!
//! - `user` - Portal accounts with role and Argon2 password hash
//! - `door_style`, `manufacturer`, `finish`, `glass_type` - Reference catalog
//! - `customer_order` - Order header: customer, status and frozen totals
//! - `order_line` - Priced lines of an order
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/portal/migrations/` and run via:
//! ```bash
//! cargo run -p door-portal-cli -- migrate
//! ```

pub mod catalog;
pub mod orders;
pub mod users;

use std::time::Duration;

use door_portal_core::StoreError;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::PgCatalogStore;
pub use orders::PgOrderStore;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Database(e) => Self::Backend(e.to_string()),
            RepositoryError::DataCorruption(msg) => Self::Backend(msg),
        }
    }
}

/// Map unique and foreign-key violations to `Conflict`.
///
/// `unique` and `referenced` are the messages reported for each case.
pub(crate) fn map_constraint_error(
    err: sqlx::Error,
    unique: &str,
    referenced: &str,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(unique.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(referenced.to_owned());
        }
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_maps_to_store_error() {
        assert_eq!(StoreError::from(RepositoryError::NotFound), StoreError::NotFound);
        assert_eq!(
            StoreError::from(RepositoryError::Conflict("taken".into())),
            StoreError::Conflict("taken".into())
        );
        assert!(matches!(
            StoreError::from(RepositoryError::DataCorruption("bad row".into())),
            StoreError::Backend(msg) if msg == "bad row"
        ));
    }

    #[test]
    fn test_non_database_error_is_not_a_conflict() {
        let err = map_constraint_error(sqlx::Error::RowNotFound, "dup", "ref");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
