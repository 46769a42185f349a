//! The disk abstraction shared by every backend.

use crate::StorageBackend;
use async_trait::async_trait;
use mediapanel_core::AppError;
use std::fmt;
use thiserror::Error;

/// What a disk was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Write,
    Delete,
    Probe,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageOp::Write => "write",
            StorageOp::Delete => "delete",
            StorageOp::Probe => "probe",
        })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to {op} '{key}': {reason}")]
    Failed {
        op: StorageOp,
        key: String,
        reason: String,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage misconfigured: {0}")]
    Misconfigured(String),
}

impl StorageError {
    pub fn failed(op: StorageOp, key: &str, reason: impl fmt::Display) -> Self {
        StorageError::Failed {
            op,
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::Misconfigured(msg) => AppError::Internal(msg),
            failed @ StorageError::Failed { .. } => AppError::Storage(failed.to_string()),
        }
    }
}

/// A disk: a place variants are written to and served from.
///
/// Implementations must treat deleting an absent key as success so that a
/// delete cascade can sweep every possible variant of a media record.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key`, replacing any previous file, and return its public URL.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Remove `key`; an absent file is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL of a key. Does not check that the file exists.
    fn url(&self, key: &str) -> String;

    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediapanel_core::ErrorMetadata;

    #[test]
    fn test_storage_error_into_app_error() {
        let err: AppError =
            StorageError::failed(StorageOp::Write, "media/thumb/a.jpg", "bucket gone").into();
        assert!(
            matches!(err, AppError::Storage(ref msg) if msg == "Failed to write 'media/thumb/a.jpg': bucket gone")
        );

        let err: AppError = StorageError::InvalidKey("../x".to_string()).into();
        assert_eq!(err.http_status_code(), 400);

        let err: AppError = StorageError::Misconfigured("S3_BUCKET not configured".to_string()).into();
        assert!(matches!(err, AppError::Internal(ref msg) if msg.contains("S3_BUCKET")));
    }
}
