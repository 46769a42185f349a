//! Error types module
//!
//! All failures that can reach a caller of the media library are unified under
//! `AppError`. Each variant self-describes how it is presented over HTTP through
//! the `ErrorMetadata` trait.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like an undecodable upload
    Warn,
    /// Unexpected failures
    Error,
}

/// How an error is presented to clients and to the logs.
pub trait ErrorMetadata {
    /// HTTP status code of the response
    fn http_status_code(&self) -> u16;

    /// Machine-readable code, e.g. `PAYLOAD_TOO_LARGE`
    fn error_code(&self) -> &'static str;

    /// Message safe to show to a client
    fn client_message(&self) -> String;

    /// Whether the internal message must stay out of responses
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Fixed presentation of one variant. `public_message` replaces the internal
/// message for sensitive variants.
struct Presentation {
    status: u16,
    code: &'static str,
    public_message: Option<&'static str>,
    log_level: LogLevel,
}

const fn client_fault(status: u16, code: &'static str) -> Presentation {
    Presentation {
        status,
        code,
        public_message: None,
        log_level: LogLevel::Debug,
    }
}

const fn server_fault(code: &'static str, public_message: &'static str) -> Presentation {
    Presentation {
        status: 500,
        code,
        public_message: Some(public_message),
        log_level: LogLevel::Error,
    }
}

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::Database(_) => server_fault("DATABASE_ERROR", "Failed to access database"),
            AppError::Storage(_) => server_fault("STORAGE_ERROR", "Failed to access storage"),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                server_fault("INTERNAL_ERROR", "Internal server error")
            }
            // An undecodable upload is the client's fault but worth noticing.
            AppError::ImageProcessing(_) => Presentation {
                log_level: LogLevel::Warn,
                ..client_fault(400, "IMAGE_PROCESSING_ERROR")
            },
            AppError::InvalidInput(_) => client_fault(400, "INVALID_INPUT"),
            AppError::BadRequest(_) => client_fault(400, "BAD_REQUEST"),
            AppError::NotFound(_) => client_fault(404, "NOT_FOUND"),
            AppError::Conflict(_) => client_fault(409, "CONFLICT"),
            AppError::PayloadTooLarge(_) => client_fault(413, "PAYLOAD_TOO_LARGE"),
        }
    }

    /// The message carried by client-fault variants.
    fn own_message(&self) -> Option<&str> {
        match self {
            AppError::ImageProcessing(msg)
            | AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg) => Some(msg),
            _ => None,
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display of the error followed by up to five causes.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut causes = std::iter::successors(self.source(), |err| (*err).source());
        for cause in causes.by_ref().take(5) {
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        if causes.next().is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }

    /// True when the error is a unique-constraint violation reported by PostgreSQL.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            #[cfg(feature = "sqlx")]
            AppError::Database(SqlxError::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn client_message(&self) -> String {
        match self.presentation().public_message {
            Some(public) => public.to_string(),
            None => self.own_message().unwrap_or_default().to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().public_message.is_some()
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().log_level
    }
}
