//! MediaPanel image ingestion
//!
//! Upload validation, stored filename generation, decoding, fit-to-box
//! resizing, encoding and the pipeline that writes every variant to a disk.

pub mod compression;
pub mod filename;
pub mod image;
pub mod pipeline;
pub mod validator;

pub use compression::{webp_supported, ImageCompressor, OutputFormat};
pub use filename::{generate_file_name, title_from_filename};
pub use crate::image::{DecodedImage, ImageProcessor, ImageResize};
pub use pipeline::{ImagePipeline, IngestedImage, UploadedImage};
pub use validator::{detect_mime_type, normalize_mime_type, MediaValidator, ValidationError};
