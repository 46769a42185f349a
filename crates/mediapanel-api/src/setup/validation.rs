//! Configuration validation
//!
//! Startup checks beyond what `Config::from_env` already enforces.

use anyhow::Result;
use mediapanel_core::Config;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    // Database URL, media settings and disk requirements.
    config.validate()?;

    if config.media().auto_webp && !mediapanel_processing::webp_supported() {
        tracing::warn!("MEDIA_AUTO_WEBP is set but this build has no WebP encoder; siblings are skipped");
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
