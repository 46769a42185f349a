//! S3 disk.
//!
//! Variants are written under their storage key with the image's content type
//! so the bucket (or a CDN in front of it) can serve them directly.

use crate::traits::{Storage, StorageError, StorageOp, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, Error as ObjectStoreError, ObjectStore, ObjectStoreExt, PutOptions,
    PutPayload,
};
use std::time::Instant;

/// Where an S3 disk lives and how its files are addressed publicly.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// S3-compatible provider, e.g. `http://localhost:9000` for MinIO.
    pub endpoint: Option<String>,
    /// Base that serves the bucket's keys, e.g. a CDN origin.
    pub public_url: Option<String>,
}

impl S3Settings {
    /// Base URL that a key is appended to.
    ///
    /// An explicit public URL wins; a custom endpoint is addressed path-style;
    /// AWS is addressed virtual-host style.
    fn url_base(&self) -> String {
        match (&self.public_url, &self.endpoint) {
            (Some(public), _) => public.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    url_base: String,
}

fn location(storage_key: &str) -> StorageResult<Path> {
    if storage_key.is_empty() || storage_key.split('/').any(|part| part == "..") {
        return Err(StorageError::InvalidKey(storage_key.to_string()));
    }
    Path::parse(storage_key).map_err(|e| StorageError::InvalidKey(e.to_string()))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl S3Storage {
    /// Connect to the bucket. Credentials come from the standard AWS
    /// environment variables.
    pub async fn new(settings: S3Settings) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(settings.region.clone())
            .with_bucket_name(settings.bucket.clone());

        if let Some(endpoint) = &settings.endpoint {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Misconfigured(e.to_string()))?;

        let url_base = settings.url_base();
        tracing::info!(bucket = %settings.bucket, url_base = %url_base, "S3 disk ready");

        Ok(S3Storage {
            store,
            bucket: settings.bucket,
            url_base,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = location(storage_key)?;
        let size = data.len();
        let start = Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let mut options = PutOptions::default();
        options.attributes = attributes;

        self.store
            .put_opts(&path, PutPayload::from(Bytes::from(data)), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = elapsed_ms(start),
                    "S3 upload failed"
                );
                StorageError::failed(StorageOp::Write, storage_key, e)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = elapsed_ms(start),
            "S3 upload successful"
        );

        Ok(self.url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = location(storage_key)?;
        let start = Instant::now();

        match self.store.delete(&path).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = elapsed_ms(start),
                    "S3 delete successful"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = elapsed_ms(start),
                    "S3 delete failed"
                );
                Err(StorageError::failed(StorageOp::Delete, storage_key, e))
            }
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = location(storage_key)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::failed(StorageOp::Probe, storage_key, e)),
        }
    }

    fn url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.url_base, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
