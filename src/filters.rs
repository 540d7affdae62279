//! The filter catalogue: a closed set of named single-frame transforms,
//! each lifted to animation-awareness through the
//! [animation adapter](crate::animate).
//!
//! Every transform normalizes its frame first (RGBA, bounded pixel count)
//! and returns a fresh raster. Dispatch is by the [`Filter`] enum — an
//! unknown name is a parse error at the boundary, never a failed lookup at
//! call time.
//!
//! | Filter | Behavior |
//! |--------|----------|
//! | `blur` | Gaussian blur, radius 2.5 |
//! | `deepfry` | lossy resample chain + posterize + red-channel colorize blend + heavy sharpen |
//! | `flip` | vertical flip |
//! | `grayscale` | convert to luminance+alpha |
//! | `invert` | invert RGB, original alpha kept |
//! | `jpegify` | JPEG re-encode at quality 10 |
//! | `mirror` | horizontal flip |
//! | `pixelate` | saturate + contrast + palette quantize + 8x block scale |
//! | `rank` | 5x5 minimum filter on RGB |
//! | `sepia` | per-pixel sepia matrix, alpha kept |
//! | `spread` | random pixel displacement, distance 16 |
//! | `wide` | stretch to 1.25x width, height / 1.5 |

use crate::animate::{self, MAX_FRAMES};
use crate::enhance;
use crate::frame::{FilterOutput, Source};
use crate::normalize::normalize;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Rgba, RgbaImage};
use rand::Rng;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;

/// A transform's internal work failed (e.g. jpegify's lossy re-encode
/// round trip). Propagated unchanged; there is no fallback transform.
#[derive(Debug, Error)]
#[error("filter transform failed: {0}")]
pub struct FilterError(#[from] image::ImageError);

/// The filter name did not match any catalogue entry.
#[derive(Debug, Error)]
#[error("unknown filter `{0}`")]
pub struct UnknownFilter(pub String);

/// The fixed catalogue of image filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Blur,
    Deepfry,
    Flip,
    Grayscale,
    Invert,
    Jpegify,
    Mirror,
    Pixelate,
    Rank,
    Sepia,
    Spread,
    Wide,
}

impl Filter {
    pub const ALL: [Filter; 12] = [
        Filter::Blur,
        Filter::Deepfry,
        Filter::Flip,
        Filter::Grayscale,
        Filter::Invert,
        Filter::Jpegify,
        Filter::Mirror,
        Filter::Pixelate,
        Filter::Rank,
        Filter::Sepia,
        Filter::Spread,
        Filter::Wide,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Blur => "blur",
            Filter::Deepfry => "deepfry",
            Filter::Flip => "flip",
            Filter::Grayscale => "grayscale",
            Filter::Invert => "invert",
            Filter::Jpegify => "jpegify",
            Filter::Mirror => "mirror",
            Filter::Pixelate => "pixelate",
            Filter::Rank => "rank",
            Filter::Sepia => "sepia",
            Filter::Spread => "spread",
            Filter::Wide => "wide",
        }
    }

    /// Uniform choice among the concrete filters — resolves the "random"
    /// meta-name callers accept.
    pub fn random() -> Filter {
        Self::ALL[rand::thread_rng().gen_range(0..Self::ALL.len())]
    }

    /// Apply this filter to a still or animated source.
    pub fn apply(self, source: &Source) -> Result<FilterOutput, FilterError> {
        animate::apply(source, |frame| self.transform(frame), MAX_FRAMES)
    }

    fn transform(self, frame: &DynamicImage) -> Result<DynamicImage, FilterError> {
        match self {
            Filter::Blur => Ok(blur(frame)),
            Filter::Deepfry => Ok(deepfry(frame)),
            Filter::Flip => Ok(flip(frame)),
            Filter::Grayscale => Ok(grayscale(frame)),
            Filter::Invert => Ok(invert(frame)),
            Filter::Jpegify => jpegify(frame),
            Filter::Mirror => Ok(mirror(frame)),
            Filter::Pixelate => Ok(pixelate(frame)),
            Filter::Rank => Ok(rank(frame)),
            Filter::Sepia => Ok(sepia(frame)),
            Filter::Spread => Ok(spread(frame)),
            Filter::Wide => Ok(wide(frame)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = UnknownFilter;

    /// Case-insensitive lookup by catalogue name. `"random"` is not a
    /// filter — resolve it with [`Filter::random`] before parsing.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lowered = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.name() == lowered)
            .ok_or(UnknownFilter(lowered))
    }
}

/// Gaussian blur at a fixed radius.
fn blur(frame: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgba8(imageops::blur(&normalize(frame), 2.5))
}

/// Restore the original size through a deliberately lossy resample chain,
/// posterize, then blend a contrast-boosted red layer back over the top
/// and sharpen hard.
fn deepfry(frame: &DynamicImage) -> DynamicImage {
    let rgb = DynamicImage::ImageRgba8(normalize(frame)).to_rgb8();
    let (width, height) = rgb.dimensions();
    let shrink = |exponent: f64| {
        let w = (width as f64).powf(exponent) as u32;
        let h = (height as f64).powf(exponent) as u32;
        (w.max(1), h.max(1))
    };

    let (w, h) = shrink(0.75);
    let rgb = imageops::resize(&rgb, w, h, FilterType::Lanczos3);
    let (w, h) = shrink(0.88);
    let rgb = imageops::resize(&rgb, w, h, FilterType::Triangle);
    let (w, h) = shrink(0.90);
    let rgb = imageops::resize(&rgb, w, h, FilterType::CatmullRom);
    let rgb = imageops::resize(&rgb, width, height, FilterType::CatmullRom);

    let rgb = enhance::posterize(&rgb, 4);
    let red = GrayImage::from_fn(width, height, |x, y| image::Luma([rgb.get_pixel(x, y).0[0]]));
    let red = enhance::channel_contrast(&red, 2.0);
    let red = enhance::channel_brightness(&red, 1.5);
    let red = enhance::colorize(&red, [254, 0, 2], [255, 255, 15]);
    let blended = enhance::blend(&rgb, &red, 0.75);
    DynamicImage::ImageRgb8(enhance::sharpness(&blended, 100.0))
}

/// Vertical flip.
fn flip(frame: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgba8(imageops::flip_vertical(&normalize(frame)))
}

/// Horizontal flip.
fn mirror(frame: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgba8(imageops::flip_horizontal(&normalize(frame)))
}

/// Convert to luminance+alpha.
fn grayscale(frame: &DynamicImage) -> DynamicImage {
    let image = DynamicImage::ImageRgba8(normalize(frame));
    DynamicImage::ImageLumaA8(image.to_luma_alpha8())
}

/// Invert the colour channels, keeping the original alpha.
fn invert(frame: &DynamicImage) -> DynamicImage {
    let image = normalize(frame);
    DynamicImage::ImageRgba8(enhance::rgb_operation(&image, |mut rgb| {
        imageops::invert(&mut rgb);
        rgb
    }))
}

/// Round-trip through JPEG at quality 10 to bake in compression
/// artifacts. Alpha is dropped — JPEG has no alpha channel.
fn jpegify(frame: &DynamicImage) -> Result<DynamicImage, FilterError> {
    let rgb = DynamicImage::ImageRgba8(normalize(frame)).to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), 10);
    rgb.write_with_encoder(encoder)?;
    Ok(image::load_from_memory_with_format(
        &bytes,
        ImageFormat::Jpeg,
    )?)
}

/// Saturate, boost contrast, quantize to an adaptive palette, then block
/// up: downscale by 8 (bicubic) and scale back with nearest-neighbour.
fn pixelate(frame: &DynamicImage) -> DynamicImage {
    let image = normalize(frame);
    let (width, height) = image.dimensions();
    let image = enhance::saturation(&image, 1.25);
    let image = enhance::contrast(&image, 1.25);
    let quantized = enhance::quantize_adaptive(&image, 256);
    let reduced = imageops::resize(
        &quantized,
        (width / 8).max(1),
        (height / 8).max(1),
        FilterType::CatmullRom,
    );
    DynamicImage::ImageRgb8(imageops::resize(
        &reduced,
        width,
        height,
        FilterType::Nearest,
    ))
}

/// 5x5 minimum filter on the colour channels.
fn rank(frame: &DynamicImage) -> DynamicImage {
    let image = normalize(frame);
    DynamicImage::ImageRgba8(enhance::rgb_operation(&image, |rgb| {
        enhance::rank_filter(&rgb, 5, 0)
    }))
}

/// Per-pixel sepia matrix, channels clamped at 255, alpha untouched.
fn sepia(frame: &DynamicImage) -> DynamicImage {
    let mut image = normalize(frame);
    for Rgba([r, g, b, _]) in image.pixels_mut() {
        let (red, green, blue) = (*r as f64, *g as f64, *b as f64);
        *r = (0.393 * red + 0.769 * green + 0.189 * blue).min(255.0) as u8;
        *g = (0.349 * red + 0.686 * green + 0.168 * blue).min(255.0) as u8;
        *b = (0.272 * red + 0.534 * green + 0.131 * blue).min(255.0) as u8;
    }
    DynamicImage::ImageRgba8(image)
}

/// Displace every pixel by a random offset within a fixed distance.
/// Offsets landing outside the frame leave the pixel in place.
fn spread(frame: &DynamicImage) -> DynamicImage {
    const DISTANCE: i64 = 16;
    let image = normalize(frame);
    let (width, height) = image.dimensions();
    let mut rng = rand::thread_rng();
    let out = RgbaImage::from_fn(width, height, |x, y| {
        let sx = x as i64 + rng.gen_range(-DISTANCE..=DISTANCE);
        let sy = y as i64 + rng.gen_range(-DISTANCE..=DISTANCE);
        if (0..width as i64).contains(&sx) && (0..height as i64).contains(&sy) {
            *image.get_pixel(sx as u32, sy as u32)
        } else {
            *image.get_pixel(x, y)
        }
    });
    DynamicImage::ImageRgba8(out)
}

/// Non-uniform stretch: wider and squatter.
fn wide(frame: &DynamicImage) -> DynamicImage {
    let image = normalize(frame);
    let (width, height) = image.dimensions();
    DynamicImage::ImageRgba8(imageops::resize(
        &image,
        ((width as f64 * 1.25) as u32).max(1),
        ((height as f64 / 1.5) as u32).max(1),
        FilterType::CatmullRom,
    ))
}
