//! Fit-to-box resizing.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

pub struct ImageResize;

impl ImageResize {
    /// Pick a resampling filter from the downscale ratio.
    ///
    /// Large reductions use cheaper filters; small ones keep the sharper Lanczos3.
    pub fn select_filter(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> FilterType {
        let ratio_w = src_w as f64 / dst_w.max(1) as f64;
        let ratio_h = src_h as f64 / dst_h.max(1) as f64;
        let ratio = ratio_w.max(ratio_h);

        if ratio > 2.0 {
            FilterType::Triangle
        } else if ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Largest centred region of a `src_w × src_h` image with the aspect ratio `box_w:box_h`.
    ///
    /// Returns `(x, y, width, height)`.
    pub fn fit_region(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> (u32, u32, u32, u32) {
        let (src_w64, src_h64) = (u64::from(src_w), u64::from(src_h));
        let (box_w64, box_h64) = (u64::from(box_w.max(1)), u64::from(box_h.max(1)));

        // Compare src_w/src_h against box_w/box_h without floating point.
        let (crop_w, crop_h) = if src_w64 * box_h64 > src_h64 * box_w64 {
            // Source is wider: keep full height.
            let w = (src_h64 * box_w64 / box_h64).max(1);
            (w, src_h64)
        } else {
            let h = (src_w64 * box_h64 / box_w64).max(1);
            (src_w64, h)
        };

        let x = (src_w64 - crop_w) / 2;
        let y = (src_h64 - crop_h) / 2;
        (x as u32, y as u32, crop_w as u32, crop_h as u32)
    }

    /// Crop to the box's aspect ratio, then downscale into the box.
    ///
    /// The output never exceeds the source in either dimension; a region
    /// smaller than the box is kept at its own size.
    pub fn fit(img: &DynamicImage, box_w: u32, box_h: u32) -> DynamicImage {
        let (src_w, src_h) = img.dimensions();
        let (x, y, crop_w, crop_h) = Self::fit_region(src_w, src_h, box_w, box_h);

        let cropped = if (x, y, crop_w, crop_h) == (0, 0, src_w, src_h) {
            img.clone()
        } else {
            img.crop_imm(x, y, crop_w, crop_h)
        };

        if crop_w <= box_w && crop_h <= box_h {
            return cropped;
        }

        let filter = Self::select_filter(crop_w, crop_h, box_w, box_h);
        cropped.resize_exact(box_w, box_h, filter)
    }
}
