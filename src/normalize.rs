//! Frame normalization: bounded pixel count, RGBA working mode.
//!
//! Every filter transform starts here. The dimension math is split out as
//! a pure function so the bound and aspect-ratio behavior are testable
//! without touching pixels.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::debug;

/// Ceiling on the pixel count of a working frame.
pub const MAX_PIXELS: u64 = 512 * 512;

/// Dimensions after bounding the pixel count, aspect ratio preserved.
///
/// When `width * height` exceeds [`MAX_PIXELS`], both dimensions divide by
/// `sqrt(pixels / MAX_PIXELS)` and floor, which guarantees the product of
/// the results stays within the bound. Dimensions floor at 1 so extreme
/// aspect ratios cannot collapse an axis to zero.
pub(crate) fn bounded_dimensions(width: u32, height: u32) -> (u32, u32) {
    let pixels = width as u64 * height as u64;
    if pixels <= MAX_PIXELS {
        return (width, height);
    }
    let fraction = (pixels as f64 / MAX_PIXELS as f64).sqrt();
    let bounded_w = ((width as f64 / fraction) as u32).max(1);
    let bounded_h = ((height as f64 / fraction) as u32).max(1);
    (bounded_w, bounded_h)
}

/// Convert a frame to RGBA and downsize it so its pixel count never
/// exceeds [`MAX_PIXELS`].
///
/// Dimensionally a no-op for frames already within the bound; the mode
/// conversion applies regardless.
pub fn normalize(frame: &DynamicImage) -> RgbaImage {
    let rgba = frame.to_rgba8();
    let (width, height) = rgba.dimensions();
    let (bounded_w, bounded_h) = bounded_dimensions(width, height);
    if (bounded_w, bounded_h) == (width, height) {
        return rgba;
    }
    debug!("normalizing {width}x{height} frame down to {bounded_w}x{bounded_h}");
    imageops::resize(&rgba, bounded_w, bounded_h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn small_frames_keep_their_dimensions() {
        assert_eq!(bounded_dimensions(512, 512), (512, 512));
        assert_eq!(bounded_dimensions(100, 200), (100, 200));
        assert_eq!(bounded_dimensions(1, 1), (1, 1));
    }

    #[test]
    fn large_frames_bound_pixel_count() {
        let (w, h) = bounded_dimensions(2000, 2000);
        assert!(w as u64 * h as u64 <= MAX_PIXELS);
        assert_eq!(w, h); // square stays square
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        let (w, h) = bounded_dimensions(4000, 1000);
        assert!(w as u64 * h as u64 <= MAX_PIXELS);
        let ratio = w as f64 / h as f64;
        assert!((ratio - 4.0).abs() < 0.05, "ratio drifted to {ratio}");
    }

    #[test]
    fn degenerate_axis_floors_at_one() {
        let (w, h) = bounded_dimensions(1, 1_000_000);
        assert_eq!(w, 1);
        assert!(h as u64 <= MAX_PIXELS);
    }

    #[test]
    fn normalize_resizes_oversized_frames() {
        let frame = DynamicImage::new_rgba8(1024, 1024);
        let out = normalize(&frame);
        assert!(out.width() as u64 * out.height() as u64 <= MAX_PIXELS);
        assert_eq!(out.width(), 512);
        assert_eq!(out.height(), 512);
    }

    #[test]
    fn normalize_converts_mode_without_resizing() {
        // Luma input within bounds: dimensions untouched, mode becomes RGBA
        let frame = DynamicImage::new_luma8(64, 48);
        let out = normalize(&frame);
        assert_eq!(out.dimensions(), (64, 48));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }
}
