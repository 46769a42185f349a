//! Image ingestion pipeline.
//!
//! validate → name → decode once → original + one fitted variant per preset
//! (+ optional WebP siblings) → write. The caller persists the row once
//! [`ImagePipeline::ingest`] returns.

use crate::compression::{webp_supported, ImageCompressor, OutputFormat};
use crate::filename::generate_file_name;
use crate::image::{ImageProcessor, ImageResize};
use crate::validator::{detect_mime_type, normalize_mime_type, MediaValidator};
use bytes::Bytes;
use chrono::Utc;
use image::DynamicImage;
use mediapanel_core::config::ORIGINAL_SIZE;
use mediapanel_core::models::{variant_key, webp_sibling_key};
use mediapanel_core::{AppError, MediaSettings};
use mediapanel_storage::Storage;
use std::sync::Arc;

/// An upload as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    /// As declared by the client; only consulted when the bytes are not a known format.
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Outcome of a successful ingestion: everything the metadata row needs.
#[derive(Debug, Clone)]
pub struct IngestedImage {
    pub name: String,
    pub path: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    /// Keys actually written, original first.
    pub written_keys: Vec<String>,
}

struct EncodedFile {
    key: String,
    content_type: &'static str,
    data: Bytes,
}

struct EncodedUpload {
    width: u32,
    height: u32,
    original: EncodedFile,
    variants: Vec<EncodedFile>,
}

#[derive(Clone)]
pub struct ImagePipeline {
    storage: Arc<dyn Storage>,
    settings: Arc<MediaSettings>,
}

impl ImagePipeline {
    pub fn new(storage: Arc<dyn Storage>, settings: Arc<MediaSettings>) -> Self {
        Self { storage, settings }
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    /// Validate, resize and write every variant of an upload.
    ///
    /// Only a rejected upload, an undecodable file or a failure to write the
    /// original is returned as an error; per-size failures are logged and the
    /// size is skipped.
    #[tracing::instrument(
        skip(self, upload),
        fields(
            file.name = %upload.original_name,
            file.size = upload.data.len(),
            file.content_type = %upload.content_type,
        )
    )]
    pub async fn ingest(&self, upload: UploadedImage) -> Result<IngestedImage, AppError> {
        let mime = detect_mime_type(&upload.data, &upload.content_type);
        if mime != normalize_mime_type(&upload.content_type) {
            tracing::debug!(detected = %mime, "Upload content differs from declared type");
        }
        MediaValidator::from_settings(&self.settings).validate_all(&mime, upload.data.len())?;

        let name = generate_file_name(&upload.original_name, &mime, Utc::now());
        let path = self.settings.path.clone();
        let size = upload.data.len() as i64;

        let settings = Arc::clone(&self.settings);
        let (task_name, task_path, task_mime) = (name.clone(), path.clone(), mime.clone());
        let encoded = tokio::task::spawn_blocking(move || {
            encode_upload(upload.data, &task_mime, &task_path, &task_name, &settings)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Image processing task failed: {}", e)))??;

        let mut written_keys = Vec::with_capacity(encoded.variants.len() + 1);

        let original = encoded.original;
        self.storage
            .put(&original.key, original.data.to_vec(), original.content_type)
            .await?;
        written_keys.push(original.key);

        for file in encoded.variants {
            match self
                .storage
                .put(&file.key, file.data.to_vec(), file.content_type)
                .await
            {
                Ok(_) => written_keys.push(file.key),
                Err(e) => {
                    tracing::warn!(error = %e, key = %file.key, "Failed to write image variant, skipping");
                }
            }
        }

        tracing::info!(
            name = %name,
            width = encoded.width,
            height = encoded.height,
            files = written_keys.len(),
            "Image ingested"
        );

        Ok(IngestedImage {
            name,
            path,
            mime,
            size,
            width: i32::try_from(encoded.width).unwrap_or(i32::MAX),
            height: i32::try_from(encoded.height).unwrap_or(i32::MAX),
            written_keys,
        })
    }

    /// Best-effort removal of everything an ingestion wrote.
    pub async fn discard(&self, ingested: &IngestedImage) {
        for key in &ingested.written_keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(error = %e, key = %key, "Failed to remove orphaned variant");
            }
        }
    }
}

/// CPU-bound half of the pipeline; runs on the blocking pool.
fn encode_upload(
    data: Vec<u8>,
    mime: &str,
    path: &str,
    name: &str,
    settings: &MediaSettings,
) -> Result<EncodedUpload, AppError> {
    let decoded = ImageProcessor::decode(&data)
        .map_err(|e| AppError::ImageProcessing(format!("Unable to decode image: {}", e)))?;
    let (width, height) = decoded.dimensions();

    let format = OutputFormat::from_mime(mime)
        .or_else(|| decoded.format.and_then(OutputFormat::from_image_format));
    let with_webp = settings.auto_webp && webp_supported();

    let original_key = variant_key(path, ORIGINAL_SIZE, name);
    let mut variants = Vec::new();

    let original = match format {
        Some(format) => {
            let data = ImageCompressor::compress(&decoded.image, format, settings.quality)
                .map_err(|e| AppError::ImageProcessing(format!("Unable to encode image: {}", e)))?;
            EncodedFile {
                key: original_key.clone(),
                content_type: format.to_mime_type(),
                data,
            }
        }
        None => {
            // Allowed but not re-encodable: keep the upload as-is, no resized sizes.
            tracing::warn!(mime = %mime, "No encoder for upload format, storing original only");
            EncodedFile {
                key: original_key.clone(),
                content_type: "application/octet-stream",
                data: Bytes::from(data),
            }
        }
    };

    if with_webp {
        push_webp_sibling(&mut variants, &decoded.image, &original_key, settings.quality);
    }

    let Some(format) = format else {
        return Ok(EncodedUpload {
            width,
            height,
            original,
            variants,
        });
    };

    for preset in &settings.sizes {
        let key = variant_key(path, &preset.name, name);
        let resized = ImageResize::fit(&decoded.image, preset.width, preset.height);

        match ImageCompressor::compress(&resized, format, settings.quality) {
            Ok(data) => variants.push(EncodedFile {
                key: key.clone(),
                content_type: format.to_mime_type(),
                data,
            }),
            Err(e) => {
                tracing::warn!(error = %e, size = %preset.name, "Failed to encode image size, skipping");
                continue;
            }
        }

        if with_webp {
            push_webp_sibling(&mut variants, &resized, &key, settings.quality);
        }
    }

    Ok(EncodedUpload {
        width,
        height,
        original,
        variants,
    })
}

fn push_webp_sibling(variants: &mut Vec<EncodedFile>, img: &DynamicImage, key: &str, quality: u8) {
    let webp_key = webp_sibling_key(key);
    if webp_key == key {
        return;
    }

    match ImageCompressor::compress(img, OutputFormat::WebP, quality) {
        Ok(data) => variants.push(EncodedFile {
            key: webp_key,
            content_type: OutputFormat::WebP.to_mime_type(),
            data,
        }),
        Err(e) => {
            tracing::warn!(error = %e, key = %webp_key, "Failed to encode WebP sibling, skipping");
        }
    }
}
