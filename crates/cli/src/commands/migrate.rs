//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! dp-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/portal/migrations/` and are embedded at
//! compile time.

use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending portal migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../portal/migrations")
        .run(&pool)
        .await
        .map_err(MigrationError::from)?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}
