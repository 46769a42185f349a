//! Image processing module
//!
//! - Decoding and intrinsic dimensions (processor)
//! - Fit-to-box resizing (resize)

pub mod processor;
pub mod resize;

pub use processor::{DecodedImage, ImageProcessor};
pub use resize::ImageResize;
