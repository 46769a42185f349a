//! Multipart parsing for the upload form

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use mediapanel_core::models::UploadMetadata;
use mediapanel_core::AppError;
use mediapanel_processing::UploadedImage;
use uuid::Uuid;

const IMAGE_FIELD: &str = "image";

/// Blank means "no folder"; anything else must be a UUID.
pub fn parse_folder_id(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::InvalidInput("The folder_id must be a valid UUID".to_string()))
}

/// A body cut off by the request size limit reads as an oversized file.
fn read_error(err: MultipartError, max_size_kb: u64, what: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} KB",
            max_size_kb
        ))
    } else {
        AppError::InvalidInput(format!("Failed to read {}: {}", what, err.body_text()))
    }
}

/// Extract the image and its optional metadata from the upload form.
/// Exactly one field named `image` is accepted; unknown fields are ignored.
pub async fn extract_upload(
    mut multipart: Multipart,
    max_size_kb: u64,
) -> Result<(UploadedImage, UploadMetadata), AppError> {
    let mut image: Option<UploadedImage> = None;
    let mut metadata = UploadMetadata::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, max_size_kb, "multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == IMAGE_FIELD {
            if image.is_some() {
                return Err(AppError::InvalidInput(
                    "Only one image may be uploaded per request".to_string(),
                ));
            }
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "upload".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| read_error(e, max_size_kb, "file data"))?;

            image = Some(UploadedImage {
                original_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| read_error(e, max_size_kb, &field_name))?;

        match field_name.as_str() {
            "folder_id" => metadata.folder_id = parse_folder_id(&value)?,
            "title" => metadata.title = Some(value),
            "alt" => metadata.alt = Some(value),
            "caption" => metadata.caption = Some(value),
            "description" => metadata.description = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown upload field"),
        }
    }

    let image =
        image.ok_or_else(|| AppError::InvalidInput("The image field is required".to_string()))?;

    Ok((image, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_id() {
        assert_eq!(parse_folder_id("").unwrap(), None);
        assert_eq!(parse_folder_id("   ").unwrap(), None);

        let id = Uuid::new_v4();
        assert_eq!(parse_folder_id(&id.to_string()).unwrap(), Some(id));

        assert!(matches!(
            parse_folder_id("not-a-uuid"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
