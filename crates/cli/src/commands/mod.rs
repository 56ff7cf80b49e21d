//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use door_portal::config::database_url_from_env;
use sqlx::PgPool;

/// Load `.env` and connect to the portal database.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to portal database...");
    Ok(door_portal::db::create_pool(&database_url).await?)
}
