//! Disk backed by a local directory, typically served by the app itself.

use crate::traits::{Storage, StorageError, StorageOp, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Opens (creating if needed) `root`, whose files are published under
    /// `base_url`, e.g. `storage/app/public` served at `/storage`.
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::Misconfigured(format!("cannot create {}: {}", root.display(), e))
        })?;

        Ok(LocalStorage {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves a key to a file under the root. Only plain relative segments
    /// are accepted so a key can never name a file outside it.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && !key.contains('\\')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
            && !key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if !plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        let path = self.resolve(key)?;
        let start = Instant::now();

        Self::write_file(&path, &data)
            .await
            .map_err(|e| StorageError::failed(StorageOp::Write, key, e))?;

        tracing::debug!(
            key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Wrote local file"
        );
        Ok(self.url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key, "Removed local file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::failed(StorageOp::Delete, key, e)),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::failed(StorageOp::Probe, key, e))
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
