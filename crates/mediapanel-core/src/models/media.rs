use crate::config::{MediaSettings, ORIGINAL_SIZE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_ALT_LENGTH: usize = 255;
pub const MAX_CAPTION_LENGTH: usize = 500;

/// One uploaded image. Variants are not stored as rows: every physical file is
/// addressed by `path`, a size name and `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Media {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub folder_id: Option<Uuid>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage key of one variant: `{path}/{size}/{name}`.
pub fn variant_key(path: &str, size: &str, name: &str) -> String {
    format!("{}/{}/{}", path.trim_end_matches('/'), size, name)
}

/// Key of the WebP sibling stored next to `key` (same folder, `.webp` extension).
pub fn webp_sibling_key(key: &str) -> String {
    let (dir, file) = match key.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, key),
    };
    let stem = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);
    match dir {
        Some(dir) => format!("{}/{}.webp", dir, stem),
        None => format!("{}.webp", stem),
    }
}

impl Media {
    /// Resolve a requested size to a known one; unknown names fall back to the original.
    pub fn resolve_size<'a>(&self, size: &'a str, settings: &MediaSettings) -> &'a str {
        if size == ORIGINAL_SIZE || settings.size(size).is_some() {
            size
        } else {
            ORIGINAL_SIZE
        }
    }

    /// Storage key for `size`.
    pub fn storage_key(&self, size: &str, settings: &MediaSettings) -> String {
        variant_key(&self.path, self.resolve_size(size, settings), &self.name)
    }

    /// Every key an upload may have produced: each available size plus its WebP sibling.
    pub fn variant_keys(&self, settings: &MediaSettings) -> Vec<String> {
        let mut keys = Vec::new();
        for size in settings.available_sizes() {
            let key = variant_key(&self.path, size, &self.name);
            let webp = webp_sibling_key(&key);
            keys.push(key);
            if !keys.contains(&webp) {
                keys.push(webp);
            }
        }
        keys
    }
}

/// Row data written at the end of a successful ingestion.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub name: String,
    pub path: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub folder_id: Option<Uuid>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
}

/// Optional metadata sent alongside an upload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UploadMetadata {
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 255, message = "The title may not be greater than 255 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "The alt may not be greater than 255 characters"))]
    pub alt: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "The caption may not be greater than 500 characters"))]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial metadata update. Absent fields are left alone; `null` clears a field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMediaRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub alt: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub caption: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub folder_id: Option<Option<Uuid>>,
}

impl UpdateMediaRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.alt.is_none()
            && self.caption.is_none()
            && self.description.is_none()
            && self.folder_id.is_none()
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &Option<Option<String>>,
    max: usize,
) {
    if let Some(Some(v)) = value {
        if v.chars().count() > max {
            errors.add(
                field,
                ValidationError::new("length").with_message(Cow::Owned(format!(
                    "The {} may not be greater than {} characters",
                    field, max
                ))),
            );
        }
    }
}

impl Validate for UpdateMediaRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "title", &self.title, MAX_TITLE_LENGTH);
        check_length(&mut errors, "alt", &self.alt, MAX_ALT_LENGTH);
        check_length(&mut errors, "caption", &self.caption, MAX_CAPTION_LENGTH);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Which folder a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderScope {
    /// No folder restriction.
    #[default]
    Any,
    /// Only media without a folder.
    Root,
    /// Only media in exactly this folder.
    Folder(Uuid),
}

/// Listing filter: folder scope plus free-text search over name, title and alt.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub folder: FolderScope,
    pub search: Option<String>,
}

impl MediaFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Media as returned to clients, with public URLs for every size.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResource {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub folder_id: Option<Uuid>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    /// URL of the original upload
    pub url: String,
    /// URL of the smallest configured size
    pub thumb_url: String,
    /// URL per available size
    pub urls: BTreeMap<String, String>,
    pub available_sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaResource {
    /// Build the client view; `url_for` maps a storage key to its public URL.
    pub fn from_media(
        media: Media,
        settings: &MediaSettings,
        url_for: impl Fn(&str) -> String,
    ) -> Self {
        let available_sizes: Vec<String> = settings
            .available_sizes()
            .into_iter()
            .map(String::from)
            .collect();
        let urls: BTreeMap<String, String> = available_sizes
            .iter()
            .map(|size| (size.clone(), url_for(&media.storage_key(size, settings))))
            .collect();
        let url = url_for(&media.storage_key(ORIGINAL_SIZE, settings));
        let thumb_size = settings
            .sizes
            .iter()
            .min_by_key(|p| u64::from(p.width) * u64::from(p.height))
            .map(|p| p.name.as_str())
            .unwrap_or(ORIGINAL_SIZE);
        let thumb_url = url_for(&media.storage_key(thumb_size, settings));

        MediaResource {
            id: media.id,
            name: media.name,
            path: media.path,
            mime: media.mime,
            size: media.size,
            width: media.width,
            height: media.height,
            folder_id: media.folder_id,
            title: media.title,
            alt: media.alt,
            caption: media.caption,
            description: media.description,
            url,
            thumb_url,
            urls,
            available_sizes,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }

    /// URL for `size`, falling back to the original for unknown names.
    pub fn url_for(&self, size: &str) -> &str {
        self.urls.get(size).map(String::as_str).unwrap_or(&self.url)
    }
}
