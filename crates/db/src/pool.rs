//! Postgres connection pool and schema migrations.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::StoreError;

/// The shared Postgres pool; opened once at start-up.
pub type DbPool = PgPool;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool against `database_url` holding at most `max_connections`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, StoreError> {
    info!(max_connections, "connecting to postgres");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the embedded migrations from the workspace `migrations/` directory,
/// creating the `documents` table on a fresh database.
pub async fn run_migrations(pool: &DbPool) -> Result<(), StoreError> {
    info!("applying document store migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
