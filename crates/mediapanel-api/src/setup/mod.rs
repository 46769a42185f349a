//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a served router,
//! kept out of the binary so tests can reuse the pieces.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::{AppState, SecurityConfig};
use anyhow::{Context, Result};
use mediapanel_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let (storage, public_disk) = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(
        pool,
        storage,
        config.media().clone(),
        public_disk,
        SecurityConfig {
            cors_origins: config.cors_origins().to_vec(),
        },
    ));

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
