//! Colour conversions and perceived-brightness math.
//!
//! A colour is representable three ways — a hex string (`"#f80a12"`, with
//! or without the `#`, 3-digit shorthand accepted), a 24-bit integer, and
//! an `(r, g, b)` triple — and all three interconvert losslessly. The
//! brightness calculation uses the ITU-R BT.709 luma coefficients and
//! drives the readable-overlay choice ([`text_colour`]).

use rand::Rng;
use serde::Serialize;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColourError {
    /// The hex string (after `#` stripping) was neither 3 nor 6 digits.
    #[error("colour value must be either 3 or 6 characters long, got `{value}` ({length} characters)")]
    InvalidLength { value: String, length: usize },
    /// Correct length, but the digits are not valid hexadecimal.
    #[error("colour value `{value}` is not a hexadecimal RGB value")]
    InvalidValue {
        value: String,
        source: ParseIntError,
    },
}

/// Convert a hexadecimal colour string into a 24-bit integer.
///
/// An optional leading `#` is stripped. 3-digit shorthand expands each
/// digit by duplication (`"f0a"` → `"ff00aa"`) before parsing.
pub fn hex_to_int(colour: &str) -> Result<u32, ColourError> {
    let digits = colour.strip_prefix('#').unwrap_or(colour);
    let expanded = match digits.chars().count() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        length => {
            return Err(ColourError::InvalidLength {
                value: digits.to_string(),
                length,
            });
        }
    };
    u32::from_str_radix(&expanded, 16).map_err(|source| ColourError::InvalidValue {
        value: expanded,
        source,
    })
}

/// Convert an integer colour into an `(r, g, b)` triple.
///
/// The value is assumed to be in `0..=0xFFFFFF`; no bounds check is
/// performed.
pub fn int_to_tuple(colour: u32) -> (u8, u8, u8) {
    let (r, rest) = (colour / 65536, colour % 65536);
    let (g, b) = (rest / 256, rest % 256);
    (r as u8, g as u8, b as u8)
}

/// Convert a hexadecimal colour string into an `(r, g, b)` triple.
pub fn hex_to_tuple(colour: &str) -> Result<(u8, u8, u8), ColourError> {
    Ok(int_to_tuple(hex_to_int(colour)?))
}

/// Convert an `(r, g, b)` triple into a lowercase 6-digit hex string.
pub fn tuple_to_hex(red: u8, green: u8, blue: u8) -> String {
    format!(
        "{:06x}",
        (red as u32) * 65536 + (green as u32) * 256 + blue as u32
    )
}

/// Perceived brightness of a colour (ITU-R BT.709 luma), in `0.0..=255.0`.
pub fn brightness(red: u8, green: u8, blue: u8) -> f64 {
    0.2126 * red as f64 + 0.7152 * green as f64 + 0.0722 * blue as f64
}

/// Readable overlay colour for text over the given background: black above
/// the perceptual midpoint, white at or below it.
pub fn text_colour(red: u8, green: u8, blue: u8) -> (u8, u8, u8) {
    if brightness(red, green, blue) >= 128.0 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

/// A uniformly random 24-bit colour.
pub fn random_colour() -> u32 {
    rand::thread_rng().gen_range(0..=0xFFFFFF)
}

/// All representations of one colour, plus the derived brightness fields.
///
/// This is the data behind the user-facing colour report: every field is
/// computed once from the integer form so the CLI and tests agree on the
/// exact values shown.
#[derive(Debug, Clone, Serialize)]
pub struct ColourReport {
    /// Lowercase 6-digit hex, no prefix.
    pub hex: String,
    pub integer: u32,
    /// Channels in `0..=255`.
    pub rgb: (u8, u8, u8),
    /// Channels in `0.0..=1.0`, rounded to 4 decimals.
    pub rgb_unit: (f64, f64, f64),
    pub brightness: f64,
    /// `#000000` or `#ffffff`, whichever reads better over this colour.
    pub text_colour: String,
}

impl ColourReport {
    pub fn new(integer: u32) -> Self {
        let (red, green, blue) = int_to_tuple(integer);
        let unit = |channel: u8| (channel as f64 / 255.0 * 10000.0).round() / 10000.0;
        let (text_r, text_g, text_b) = text_colour(red, green, blue);
        Self {
            hex: tuple_to_hex(red, green, blue),
            integer,
            rgb: (red, green, blue),
            rgb_unit: (unit(red), unit(green), unit(blue)),
            brightness: brightness(red, green, blue),
            text_colour: format!("#{}", tuple_to_hex(text_r, text_g, text_b)),
        }
    }

    /// Parse a hex string and build its report.
    pub fn from_hex(colour: &str) -> Result<Self, ColourError> {
        Ok(Self::new(hex_to_int(colour)?))
    }
}
