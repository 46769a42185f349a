//! Postgres pool and schema migrations.

use anyhow::{Context, Result};
use mediapanel_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Opens the pool and brings the `media` and `media_folders` tables up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let max_connections = config.db_max_connections();
    tracing::info!(max_connections, "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(config.database_url())
        .await
        .with_context(|| format!("Failed to connect to database ({} max connections)", max_connections))?;

    // Embedded at compile time from the workspace migrations/ directory.
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    Ok(pool)
}
