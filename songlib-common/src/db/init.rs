//! Database initialization
//!
//! Opens the shared connection pool and brings the schema up to date. Runs
//! once at startup; any error here is fatal for the service.

use crate::config::DbConfig;
use crate::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Open the connection pool and ensure the schema exists
pub async fn init_database(config: &DbConfig) -> Result<PgPool> {
    let pool = connect(config).await?;
    info!("Connected to database: {}", config);

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Open the shared connection pool without touching the schema
pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(config.connect_options())
        .await?;

    Ok(pool)
}

/// Create missing tables/columns and the group-name uniqueness index.
///
/// Idempotent - safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    crate::db::table_schemas::sync_all_table_schemas(pool).await?;

    // Tables created by older deployments may lack the UNIQUE constraint on
    // groups.name. The name matches the one PostgreSQL gives the inline
    // constraint, so this is a no-op on freshly created tables.
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS groups_name_key ON groups (name)")
        .execute(pool)
        .await?;

    info!("Database schema is up to date");
    Ok(())
}
