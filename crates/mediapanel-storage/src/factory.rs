#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::s3::{S3Settings, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use mediapanel_core::Config;
use std::sync::Arc;

#[cfg(feature = "storage-s3")]
fn required(value: Option<&str>, name: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::Misconfigured(format!("{} not configured", name)))
}

/// Create the disk named by the media settings: `s3`, or a local directory
/// for any other disk name.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let settings = S3Settings {
                bucket: required(config.s3_bucket(), "S3_BUCKET")?,
                region: required(config.s3_region().or_else(|| config.aws_region()), "S3_REGION")?,
                endpoint: config.s3_endpoint().map(String::from),
                public_url: config.s3_public_url().map(String::from),
            };
            Ok(Arc::new(S3Storage::new(settings).await?))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::Misconfigured(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            tracing::info!(
                disk = %config.media().disk,
                root = %config.local_storage_path(),
                "Using local disk"
            );
            let storage = LocalStorage::new(
                config.local_storage_path(),
                config.local_storage_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::Misconfigured(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
