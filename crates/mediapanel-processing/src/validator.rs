use mediapanel_core::{AppError, MediaSettings};

/// Upload rejections, in the order they are checked.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid image type. Allowed types: {}", allowed.join(", "))]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File size exceeds maximum allowed size of {max_kb} KB")]
    FileTooLarge { size: usize, max_kb: u64 },

    #[error("The uploaded file is empty")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        }
    }
}

/// Strip parameters (`; charset=...`) and lowercase a MIME type.
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// MIME type of an upload, read from its leading bytes. The client's declared
/// type is only used when the content is not a recognised image format.
pub fn detect_mime_type(data: &[u8], declared: &str) -> String {
    match ::image::guess_format(data) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => normalize_mime_type(declared),
    }
}

/// Upload validator built from the media settings.
///
/// Runs before anything is written, so a rejected upload leaves no file and
/// no row behind.
pub struct MediaValidator {
    max_file_size: usize,
    max_size_kb: u64,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_size_kb: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size: (max_size_kb as usize).saturating_mul(1024),
            max_size_kb,
            allowed_content_types: allowed_content_types
                .iter()
                .map(|ct| normalize_mime_type(ct))
                .collect(),
        }
    }

    pub fn from_settings(settings: &MediaSettings) -> Self {
        Self::new(settings.max_size_kb, settings.allowed_mimes.clone())
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type);

        if !self.allowed_content_types.contains(&normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max_kb: self.max_size_kb,
            });
        }

        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        Ok(())
    }

    /// MIME type first, then size.
    pub fn validate_all(&self, content_type: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediapanel_core::ErrorMetadata;

    fn test_validator() -> MediaValidator {
        MediaValidator::from_settings(&MediaSettings::default())
    }

    #[test]
    fn test_detected_type_wins_over_declared() {
        let png_magic = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert_eq!(detect_mime_type(png_magic, "application/octet-stream"), "image/png");

        let jpeg_magic = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(detect_mime_type(&jpeg_magic, "image/png"), "image/jpeg");

        assert_eq!(detect_mime_type(b"%PDF-1.4", "Application/PDF"), "application/pdf");
    }

    #[test]
    fn test_allowed_types_pass() {
        let validator = test_validator();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("IMAGE/PNG").is_ok());
        assert!(validator
            .validate_content_type("image/webp; charset=binary")
            .is_ok());
    }

    #[test]
    fn test_rejected_type_message_lists_allow_list() {
        let validator = test_validator();
        let err = validator.validate_content_type("image/svg+xml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid image type. Allowed types: image/jpeg, image/png, image/gif, image/webp"
        );
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let validator = MediaValidator::new(1, vec!["image/png".to_string()]);
        assert!(validator.validate_file_size(1024).is_ok());

        let err = validator.validate_file_size(1025).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size exceeds maximum allowed size of 1 KB"
        );
    }

    #[test]
    fn test_empty_file_rejected() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_mime_checked_before_size() {
        let validator = MediaValidator::new(1, vec!["image/png".to_string()]);
        let err = validator.validate_all("text/plain", 10_000).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));
    }

    #[test]
    fn test_into_app_error_statuses() {
        let validator = MediaValidator::new(1, vec!["image/png".to_string()]);

        let err: AppError = validator.validate_all("image/png", 4096).unwrap_err().into();
        assert_eq!(err.http_status_code(), 413);

        let err: AppError = validator.validate_all("image/tiff", 10).unwrap_err().into();
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().starts_with("Invalid image type."));
    }
}
