//! Storage setup and initialization

use crate::state::PublicDisk;
use anyhow::Result;
use mediapanel_core::{Config, StorageBackend};
use mediapanel_storage::{create_storage, Storage};
use std::path::PathBuf;
use std::sync::Arc;

/// Local disks whose base URL is a path on this host are served by the app itself.
pub fn public_disk(config: &Config) -> Option<PublicDisk> {
    if config.storage_backend() != StorageBackend::Local {
        return None;
    }
    let mount = config.local_storage_base_url().trim_end_matches('/');
    if !mount.starts_with('/') || mount.len() < 2 {
        return None;
    }
    Some(PublicDisk {
        mount: mount.to_string(),
        root: PathBuf::from(config.local_storage_path()),
    })
}

/// Create the configured disk; for a local disk also report where it is mounted.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Option<PublicDisk>)> {
    tracing::info!(disk = %config.media().disk, "Initializing storage...");
    let storage = create_storage(config).await?;
    let backend_type = storage.backend_type();

    let public_disk = public_disk(config);
    tracing::info!(
        backend = ?backend_type,
        mount = ?public_disk.as_ref().map(|d| d.mount.as_str()),
        "Storage initialized successfully"
    );

    Ok((storage, public_disk))
}
