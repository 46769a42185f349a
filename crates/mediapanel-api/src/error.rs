//! HTTP error response conversion
//!
//! Every failure leaves the service as the `{success: false, message, data: null}`
//! envelope with the status declared by the error's metadata.
//!
//! Handlers attach the operation prefix with [`FailureContext::failed`], so a
//! storage error during upload reads `Media upload failed: Failed to access storage`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mediapanel_core::models::ApiEnvelope;
use mediapanel_core::{AppError, ErrorMetadata, LogLevel};
use serde::de::DeserializeOwned;

/// `AppError` plus the operation it interrupted, rendered as the failure envelope.
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    context: Option<&'static str>,
}

impl HttpAppError {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            context: None,
        }
    }

    /// Prefix the client message with the failed operation. The first prefix wins.
    pub fn context(mut self, context: &'static str) -> Self {
        self.context.get_or_insert(context);
        self
    }

    /// Message placed in the envelope. Not-found errors keep their own wording.
    pub fn client_message(&self) -> String {
        let reason = self.error.client_message();
        match (self.context, &self.error) {
            (_, AppError::NotFound(_)) | (None, _) => reason,
            (Some(context), _) => format!("{}: {}", context, reason),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError::new(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError::new(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError::new(AppError::PayloadTooLarge(
                "Request body too large".to_string(),
            ));
        }
        let body_text = rejection.body_text();
        let message = if body_text.contains("expected a formatted UUID") {
            "Invalid request body: folder_id must be a UUID string".to_string()
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError::new(AppError::InvalidInput(message))
    }
}

impl From<PathRejection> for HttpAppError {
    fn from(rejection: PathRejection) -> Self {
        HttpAppError::new(AppError::InvalidInput(format!(
            "Invalid identifier: {}",
            rejection.body_text()
        )))
    }
}

/// Attach an operation prefix to any error on its way to the client.
pub trait FailureContext<T> {
    fn failed(self, context: &'static str) -> Result<T, HttpAppError>;
}

impl<T, E> FailureContext<T> for Result<T, E>
where
    E: Into<HttpAppError>,
{
    fn failed(self, context: &'static str) -> Result<T, HttpAppError> {
        self.map_err(|e| e.into().context(context))
    }
}

/// `Json<T>` whose rejection is the 400 failure envelope.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

/// Path extractor with the same envelope on malformed identifiers.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedPath(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type,
                code,
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.error);

        let status = self.status();
        let body = ApiEnvelope::<()>::failure(self.client_message());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: HttpAppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_context_prefixes_message() {
        let err = HttpAppError::from(AppError::InvalidInput(
            "Invalid image type. Allowed types: image/png".to_string(),
        ))
        .context("Media upload failed");

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Media upload failed: Invalid image type. Allowed types: image/png"
        );
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_not_found_keeps_plain_message() {
        let result: Result<(), AppError> = Err(AppError::NotFound("Media not found".to_string()));
        let err = result.failed("Media delete failed").unwrap_err();

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Media not found");
    }

    #[tokio::test]
    async fn test_sensitive_errors_hide_details() {
        let err = HttpAppError::from(AppError::Storage("s3 bucket unreachable".to_string()))
            .context("Media delete failed");

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Media delete failed: Failed to access storage");
    }

    #[tokio::test]
    async fn test_payload_too_large_status() {
        let err = HttpAppError::from(AppError::PayloadTooLarge(
            "File size exceeds maximum allowed size of 5120 KB".to_string(),
        ));
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_first_context_wins() {
        let err = HttpAppError::from(AppError::Conflict("taken".to_string()))
            .context("Folder creation failed")
            .context("Outer");
        assert_eq!(err.client_message(), "Folder creation failed: taken");
    }
}
