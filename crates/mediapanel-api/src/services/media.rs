//! Media library service
//!
//! Glues the ingestion pipeline to the metadata repository: an upload is
//! written to the disk first and recorded second, and a record that cannot be
//! written takes its files with it.

use mediapanel_core::models::media::MAX_TITLE_LENGTH;
use mediapanel_core::models::{
    Media, MediaFilter, MediaResource, NewMedia, UpdateMediaRequest, UploadMetadata,
};
use mediapanel_core::{AppError, MediaSettings};
use mediapanel_db::{FolderRepository, MediaRepository};
use mediapanel_processing::{title_from_filename, ImagePipeline, UploadedImage};
use mediapanel_storage::Storage;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn truncate_chars(value: String, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value,
    }
}

#[derive(Clone)]
pub struct MediaService {
    pipeline: ImagePipeline,
    media: MediaRepository,
    folders: FolderRepository,
    storage: Arc<dyn Storage>,
    settings: Arc<MediaSettings>,
}

impl MediaService {
    pub fn new(
        storage: Arc<dyn Storage>,
        settings: Arc<MediaSettings>,
        media: MediaRepository,
        folders: FolderRepository,
    ) -> Self {
        Self {
            pipeline: ImagePipeline::new(storage.clone(), settings.clone()),
            media,
            folders,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    /// Ingest an upload and record it.
    ///
    /// Title and alt default to the client filename's stem. When folders are
    /// disabled any `folder_id` is ignored.
    #[tracing::instrument(skip(self, upload, metadata), fields(file.name = %upload.original_name))]
    pub async fn upload(
        &self,
        upload: UploadedImage,
        metadata: UploadMetadata,
    ) -> Result<Media, AppError> {
        metadata.validate()?;
        let folder_id = self.resolve_folder(metadata.folder_id).await?;

        let fallback =
            title_from_filename(&upload.original_name).map(|t| truncate_chars(t, MAX_TITLE_LENGTH));
        let ingested = self.pipeline.ingest(upload).await?;

        let record = NewMedia {
            name: ingested.name.clone(),
            path: ingested.path.clone(),
            mime: ingested.mime.clone(),
            size: ingested.size,
            width: ingested.width,
            height: ingested.height,
            folder_id,
            title: non_empty(metadata.title).or_else(|| fallback.clone()),
            alt: non_empty(metadata.alt).or(fallback),
            caption: non_empty(metadata.caption),
            description: non_empty(metadata.description),
        };

        match self.media.store(record).await {
            Ok(media) => {
                tracing::info!(media_id = %media.id, name = %media.name, "Media uploaded");
                Ok(media)
            }
            Err(e) => {
                tracing::error!(error = %e, name = %ingested.name, "Failed to record upload, removing files");
                self.pipeline.discard(&ingested).await;
                Err(e)
            }
        }
    }

    async fn resolve_folder(&self, folder_id: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
        if !self.settings.folders_enabled {
            return Ok(None);
        }
        match folder_id {
            Some(id) if !self.folders.exists(id).await? => {
                Err(AppError::NotFound("Folder not found".to_string()))
            }
            other => Ok(other),
        }
    }

    /// Apply a partial metadata update.
    pub async fn update(&self, id: Uuid, mut request: UpdateMediaRequest) -> Result<Media, AppError> {
        request.validate()?;

        if !self.settings.folders_enabled {
            request.folder_id = None;
        } else if let Some(Some(folder_id)) = request.folder_id {
            self.resolve_folder(Some(folder_id)).await?;
        }

        if request.is_empty() {
            return self
                .find(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Media not found".to_string()));
        }

        self.media.update(id, request).await
    }

    /// Remove every file of a record, then the record.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.media.delete(id).await? {
            tracing::info!(media_id = %id, "Media deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Media not found".to_string()))
        }
    }

    pub async fn all(&self, filter: &MediaFilter) -> Result<Vec<Media>, AppError> {
        self.media.all(filter).await
    }

    pub async fn by_folder(&self, folder_id: Option<Uuid>) -> Result<Vec<Media>, AppError> {
        self.media.by_folder(folder_id).await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Media>, AppError> {
        self.media.search(term).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        self.media.find(id).await
    }

    /// Client view of a record with a public URL per size.
    pub fn to_resource(&self, media: Media) -> MediaResource {
        MediaResource::from_media(media, &self.settings, |key| self.storage.url(key))
    }

    pub fn to_resources(&self, media: Vec<Media>) -> Vec<MediaResource> {
        media.into_iter().map(|m| self.to_resource(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims_blank_form_fields() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Dog ".to_string())), Some("Dog".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("éééé".to_string(), 2), "éé");
        assert_eq!(truncate_chars("short".to_string(), 255), "short");
    }
}
