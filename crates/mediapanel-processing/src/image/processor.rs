//! Image processor - decoding and intrinsic dimensions

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

/// A decoded upload. The pipeline decodes once and derives every variant from it.
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode image bytes, sniffing the format from the content.
    pub fn decode(data: &[u8]) -> Result<DecodedImage, anyhow::Error> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode()?;

        if image.width() == 0 || image.height() == 0 {
            return Err(anyhow::anyhow!("Image has zero width or height"));
        }

        Ok(DecodedImage { image, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buffer
    }

    #[test]
    fn test_decode_reports_true_dimensions() {
        let decoded = ImageProcessor::decode(&create_test_image(120, 45)).unwrap();
        assert_eq!(decoded.dimensions(), (120, 45));
        assert_eq!(decoded.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_decode_invalid_image() {
        assert!(ImageProcessor::decode(b"not an image").is_err());
        assert!(ImageProcessor::decode(b"").is_err());
    }
}
