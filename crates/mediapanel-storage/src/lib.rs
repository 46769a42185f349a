//! MediaPanel storage library
//!
//! A disk maps storage keys to physical files and to public URLs. Keys look
//! like `{path}/{size}/{name}` and must not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediapanel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Settings, S3Storage};
pub use traits::{Storage, StorageError, StorageOp, StorageResult};
