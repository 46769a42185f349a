//! MediaPanel core library
//!
//! Domain models, error types and configuration shared by the storage,
//! processing, database and HTTP crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{BaseConfig, Config, MediaPanelConfig, MediaSettings, SizePreset};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
