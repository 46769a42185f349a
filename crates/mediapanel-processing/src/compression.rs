//! Variant encoding.
//!
//! Variants are written in the upload's own format. JPEG and WebP honour the
//! configured quality; PNG and GIF are lossless.

use anyhow::Result;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Output format for encoded variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl OutputFormat {
    /// Format for a (normalised) MIME type; `None` when the pipeline cannot encode it.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/gif" => Some(OutputFormat::Gif),
            "image/webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::Gif => Some(OutputFormat::Gif),
            ImageFormat::WebP => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Whether WebP siblings can be produced by this build.
pub fn webp_supported() -> bool {
    cfg!(feature = "webp")
}

pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`. `quality` is 1-100.
    pub fn compress(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Bytes> {
        match format {
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            OutputFormat::Png => Self::compress_lossless(img, ImageFormat::Png),
            OutputFormat::Gif => Self::compress_lossless(img, ImageFormat::Gif),
            OutputFormat::WebP => Self::compress_webp(img, quality),
        }
    }

    fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        // JPEG has no alpha channel.
        let rgb_img = DynamicImage::ImageRgb8(img.to_rgb8());

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb_img.write_with_encoder(encoder)?;

        Ok(Bytes::from(buffer))
    }

    fn compress_lossless(img: &DynamicImage, format: ImageFormat) -> Result<Bytes> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        match format {
            // The GIF encoder only takes RGBA8.
            ImageFormat::Gif => {
                DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut cursor, format)?
            }
            _ => img.write_to(&mut cursor, format)?,
        }

        Ok(Bytes::from(buffer))
    }

    #[cfg(feature = "webp")]
    fn compress_webp(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        use image::GenericImageView;

        let (width, height) = img.dimensions();

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(f32::from(quality.clamp(1, 100)));

        Ok(Bytes::copy_from_slice(&webp_data))
    }

    #[cfg(not(feature = "webp"))]
    fn compress_webp(img: &DynamicImage, _quality: u8) -> Result<Bytes> {
        // image's built-in WebP encoder is lossless only.
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
            .map_err(|e| anyhow::anyhow!("WebP encoding unavailable: {}", e))?;
        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageProcessor;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, Rgba([200, 120, 40, 255])))
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(OutputFormat::from_mime("image/jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_mime("image/gif"), Some(OutputFormat::Gif));
        assert_eq!(OutputFormat::from_mime("image/svg+xml"), None);
        assert_eq!(OutputFormat::WebP.to_mime_type(), "image/webp");
    }

    #[test]
    fn test_each_format_decodes_back() {
        let img = test_image();
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Gif] {
            let bytes = ImageCompressor::compress(&img, format, 85).unwrap();
            let decoded = ImageProcessor::decode(&bytes).unwrap();
            assert_eq!(decoded.image.dimensions(), (64, 48), "{:?}", format);
        }
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let mut noisy = RgbaImage::new(128, 128);
        for (x, y, px) in noisy.enumerate_pixels_mut() {
            *px = Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8, 255]);
        }
        let img = DynamicImage::ImageRgba8(noisy);

        let low = ImageCompressor::compress(&img, OutputFormat::Jpeg, 10).unwrap();
        let high = ImageCompressor::compress(&img, OutputFormat::Jpeg, 95).unwrap();
        assert!(low.len() < high.len());
    }

    #[cfg(feature = "webp")]
    #[test]
    fn test_webp_encode() {
        assert!(webp_supported());
        let bytes = ImageCompressor::compress(&test_image(), OutputFormat::WebP, 80).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }
}
