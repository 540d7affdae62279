//! Low-level pixel operators shared by the filter catalogue.
//!
//! Saturation, contrast, and sharpness are interpolation operators: each
//! builds a degenerate version of the input (grayscale, solid mean-gray,
//! smoothed) and linearly interpolates from it toward the original by the
//! given factor, clamping to `0..=255`. Factors above 1.0 therefore
//! overshoot past the original — that is what "boost contrast 2x" means
//! here. The remaining helpers are straight per-pixel maps.

use color_quant::NeuQuant;
use image::imageops;
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// ITU-R 601-2 luma, the grayscale the interpolation operators degrade to.
fn luma_601(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Interpolate from `from` toward `to` by `factor`, clamped to `0..=255`.
fn lerp(from: f32, to: f32, factor: f32) -> u8 {
    (from + (to - from) * factor).round().clamp(0.0, 255.0) as u8
}

/// Boost (or mute) colour saturation. Alpha passes through untouched.
pub(crate) fn saturation(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mut out = image.clone();
    for Rgba([r, g, b, _]) in out.pixels_mut() {
        let gray = luma_601(*r, *g, *b);
        *r = lerp(gray, *r as f32, factor);
        *g = lerp(gray, *g as f32, factor);
        *b = lerp(gray, *b as f32, factor);
    }
    out
}

/// Mean luma of the image, rounded to the nearest integer level.
fn mean_level(image: &RgbaImage) -> f32 {
    let sum: f64 = image
        .pixels()
        .map(|Rgba([r, g, b, _])| luma_601(*r, *g, *b) as f64)
        .sum();
    ((sum / image.pixels().len() as f64) + 0.5).floor() as f32
}

/// Boost (or mute) contrast around the image's mean luma level.
pub(crate) fn contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_level(image);
    let mut out = image.clone();
    for Rgba([r, g, b, _]) in out.pixels_mut() {
        *r = lerp(mean, *r as f32, factor);
        *g = lerp(mean, *g as f32, factor);
        *b = lerp(mean, *b as f32, factor);
    }
    out
}

/// Contrast boost for a single channel, around the channel's own mean.
pub(crate) fn channel_contrast(channel: &GrayImage, factor: f32) -> GrayImage {
    let sum: f64 = channel.pixels().map(|Luma([v])| *v as f64).sum();
    let mean = ((sum / channel.pixels().len() as f64) + 0.5).floor() as f32;
    let mut out = channel.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = lerp(mean, *v as f32, factor);
    }
    out
}

/// Brightness scale for a single channel (interpolation from black).
pub(crate) fn channel_brightness(channel: &GrayImage, factor: f32) -> GrayImage {
    let mut out = channel.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = lerp(0.0, *v as f32, factor);
    }
    out
}

/// Map a single channel onto a two-point colour ramp: channel value 0
/// takes the `black` endpoint, 255 the `white` endpoint.
pub(crate) fn colorize(channel: &GrayImage, black: [u8; 3], white: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(channel.width(), channel.height(), |x, y| {
        let Luma([v]) = *channel.get_pixel(x, y);
        let t = v as f32 / 255.0;
        Rgb([
            lerp(black[0] as f32, white[0] as f32, t),
            lerp(black[1] as f32, white[1] as f32, t),
            lerp(black[2] as f32, white[2] as f32, t),
        ])
    })
}

/// Blend two equally-sized images: `alpha` 0.0 yields `base`, 1.0 yields
/// `overlay`.
pub(crate) fn blend(base: &RgbImage, overlay: &RgbImage, alpha: f32) -> RgbImage {
    RgbImage::from_fn(base.width(), base.height(), |x, y| {
        let Rgb(a) = *base.get_pixel(x, y);
        let Rgb(b) = *overlay.get_pixel(x, y);
        Rgb([
            lerp(a[0] as f32, b[0] as f32, alpha),
            lerp(a[1] as f32, b[1] as f32, alpha),
            lerp(a[2] as f32, b[2] as f32, alpha),
        ])
    })
}

/// Reduce each channel to the given number of significant bits.
pub(crate) fn posterize(image: &RgbImage, bits: u8) -> RgbImage {
    let mask = !(0xFFu8 >> bits);
    let mut out = image.clone();
    for Rgb(channels) in out.pixels_mut() {
        for v in channels {
            *v &= mask;
        }
    }
    out
}

/// 3x3 smoothing kernel (centre-weighted box), the degenerate image the
/// sharpness operator interpolates away from.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Sharpen by interpolating from the smoothed image toward (and past) the
/// original. Large factors drive edges to saturation.
pub(crate) fn sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = imageops::filter3x3(image, &SMOOTH_KERNEL);
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb(original) = *image.get_pixel(x, y);
        let Rgb(smooth) = *smoothed.get_pixel(x, y);
        Rgb([
            lerp(smooth[0] as f32, original[0] as f32, factor),
            lerp(smooth[1] as f32, original[1] as f32, factor),
            lerp(smooth[2] as f32, original[2] as f32, factor),
        ])
    })
}

/// Apply an RGB-only operation, carrying the alpha channel across
/// unchanged per-pixel.
pub(crate) fn rgb_operation(
    image: &RgbaImage,
    op: impl FnOnce(RgbImage) -> RgbImage,
) -> RgbaImage {
    let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, _]) = *image.get_pixel(x, y);
        Rgb([r, g, b])
    });
    let transformed = op(rgb);
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *transformed.get_pixel(x, y);
        let Rgba([_, _, _, a]) = *image.get_pixel(x, y);
        Rgba([r, g, b, a])
    })
}

/// Per-channel rank filter over a square window: sort the window's values
/// and take the `rank`-th (0 = minimum). Edges replicate outward.
pub(crate) fn rank_filter(image: &RgbImage, size: u32, rank: usize) -> RgbImage {
    let (width, height) = image.dimensions();
    let margin = (size / 2) as i64;
    let mut window = Vec::with_capacity((size * size) as usize);
    RgbImage::from_fn(width, height, |x, y| {
        let mut picked = [0u8; 3];
        for channel in 0..3 {
            window.clear();
            for dy in -margin..=margin {
                for dx in -margin..=margin {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window.push(image.get_pixel(sx, sy).0[channel]);
                }
            }
            window.sort_unstable();
            picked[channel] = window[rank.min(window.len() - 1)];
        }
        Rgb(picked)
    })
}

/// Quantize to an adaptive palette of at most `colors` entries, mapping
/// every pixel onto its nearest palette colour.
pub(crate) fn quantize_adaptive(image: &RgbaImage, colors: usize) -> RgbImage {
    let quantizer = NeuQuant::new(10, colors, image.as_raw());
    let palette = quantizer.color_map_rgba();
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let offset = quantizer.index_of(&[r, g, b, a]) * 4;
        Rgb([palette[offset], palette[offset + 1], palette[offset + 2]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgba(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn saturation_zero_desaturates() {
        let image = solid_rgba(4, 4, [200, 50, 50, 255]);
        let out = saturation(&image, 0.0);
        let Rgba([r, g, b, a]) = *out.get_pixel(0, 0);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn saturation_one_is_identity() {
        let image = solid_rgba(4, 4, [200, 50, 50, 128]);
        let out = saturation(&image, 1.0);
        assert_eq!(out, image);
    }

    #[test]
    fn contrast_pushes_away_from_mean() {
        let mut image = solid_rgba(2, 1, [0, 0, 0, 255]);
        image.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let out = contrast(&image, 2.0);
        // Dark pixel darker (already floored), bright pixel brighter
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert!(out.get_pixel(1, 0).0[0] > 200);
    }

    #[test]
    fn channel_brightness_scales() {
        let channel = GrayImage::from_pixel(2, 2, Luma([100]));
        let out = channel_brightness(&channel, 1.5);
        assert_eq!(out.get_pixel(0, 0).0[0], 150);
        let clamped = channel_brightness(&GrayImage::from_pixel(1, 1, Luma([200])), 1.5);
        assert_eq!(clamped.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn colorize_endpoints() {
        let mut channel = GrayImage::from_pixel(2, 1, Luma([0]));
        channel.put_pixel(1, 0, Luma([255]));
        let out = colorize(&channel, [254, 0, 2], [255, 255, 15]);
        assert_eq!(out.get_pixel(0, 0), &Rgb([254, 0, 2]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 15]));
    }

    #[test]
    fn blend_interpolates() {
        let base = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        let overlay = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        assert_eq!(blend(&base, &overlay, 0.75).get_pixel(0, 0), &Rgb([75, 75, 75]));
    }

    #[test]
    fn posterize_masks_low_bits() {
        let image = RgbImage::from_pixel(1, 1, Rgb([0b1010_1111, 0b0001_0001, 255]));
        let out = posterize(&image, 4);
        assert_eq!(out.get_pixel(0, 0), &Rgb([0b1010_0000, 0b0001_0000, 0b1111_0000]));
    }

    #[test]
    fn sharpness_identity_on_flat_image() {
        // No edges to exaggerate: smoothing a solid image returns it
        let image = RgbImage::from_pixel(5, 5, Rgb([90, 90, 90]));
        let out = sharpness(&image, 100.0);
        assert_eq!(out, image);
    }

    #[test]
    fn rgb_operation_preserves_alpha() {
        let image = solid_rgba(3, 3, [10, 20, 30, 77]);
        let out = rgb_operation(&image, |mut rgb| {
            imageops::invert(&mut rgb);
            rgb
        });
        assert_eq!(out.get_pixel(1, 1), &Rgba([245, 235, 225, 77]));
    }

    #[test]
    fn rank_zero_is_minimum_filter() {
        let mut image = RgbImage::from_pixel(5, 5, Rgb([200, 200, 200]));
        image.put_pixel(2, 2, Rgb([10, 10, 10]));
        let out = rank_filter(&image, 5, 0);
        // The dark pixel's value wins everywhere its 5x5 window reaches
        assert_eq!(out.get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(out.get_pixel(4, 4), &Rgb([10, 10, 10]));
    }

    #[test]
    fn quantize_keeps_dominant_colours_close() {
        let mut image = solid_rgba(8, 8, [250, 10, 10, 255]);
        for x in 0..8 {
            image.put_pixel(x, 0, Rgba([10, 10, 250, 255]));
        }
        let out = quantize_adaptive(&image, 256);
        let Rgb([r, _, b]) = *out.get_pixel(4, 4);
        assert!(r > 200 && b < 60, "dominant red drifted: {r},{b}");
    }
}
