//! Byte-level decode and encode for the filter pipeline.
//!
//! | Direction | Container | Crate / function |
//! |---|---|---|
//! | Decode (PNG, JPEG, WebP, BMP) | static | `image::load_from_memory_with_format` |
//! | Decode (GIF) | animated | `gif` decoder + full-canvas disposal compositing |
//! | Encode (still) | PNG | `image` PNG encoder |
//! | Encode (sequence) | GIF | `gif` encoder, background disposal |
//!
//! GIF frames can be partial rectangles over a persistent canvas, so the
//! decoder composites each frame onto a running canvas and honors the
//! source's disposal methods; the output of [`decode`] is always a list
//! of full-size RGBA frames. On the way out every frame is written with
//! background disposal so transparent animations do not ghost.

use crate::frame::{FilterOutput, Frame, LoopCount, Sequence, Source};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::debug;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The supplied bytes are not a supported raster format.
    #[error("unrecognized or corrupt image data: {0}")]
    UnsupportedImageData(String),
    /// Serialization to the output container failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Container format of an encoded result, for file-extension selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedFormat {
    Png,
    Gif,
}

impl EncodedFormat {
    pub fn extension(self) -> &'static str {
        match self {
            EncodedFormat::Png => "png",
            EncodedFormat::Gif => "gif",
        }
    }
}

/// An encoded image plus its container tag.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: EncodedFormat,
}

/// Decode raw bytes into a still image or an animated sequence.
///
/// Single-frame GIFs collapse to [`Source::Still`].
pub fn decode(bytes: &[u8]) -> Result<Source, CodecError> {
    let format = image::guess_format(bytes)
        .map_err(|e| CodecError::UnsupportedImageData(e.to_string()))?;
    if format == ImageFormat::Gif {
        return decode_gif(bytes);
    }
    debug!("decoding {} bytes as {format:?}", bytes.len());
    image::load_from_memory_with_format(bytes, format)
        .map(Source::Still)
        .map_err(|e| CodecError::UnsupportedImageData(e.to_string()))
}

/// Serialize a filter result: PNG for stills, GIF for sequences.
pub fn encode(output: &FilterOutput) -> Result<Encoded, CodecError> {
    match output {
        FilterOutput::Still(image) => {
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| CodecError::Encode(format!("PNG: {e}")))?;
            Ok(Encoded {
                bytes,
                format: EncodedFormat::Png,
            })
        }
        FilterOutput::Animated(seq) => encode_gif(seq),
    }
}

fn decode_gif(bytes: &[u8]) -> Result<Source, CodecError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| CodecError::UnsupportedImageData(e.to_string()))?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    let loop_count = match decoder.repeat() {
        gif::Repeat::Infinite => LoopCount::Infinite,
        // Finite(0) is the decoder's value for "no loop metadata in the
        // source"; writing 0 back out would mean "loop forever"
        gif::Repeat::Finite(0) => LoopCount::default(),
        gif::Repeat::Finite(count) => LoopCount::Finite(count),
    };

    let mut frames: Vec<Frame> = Vec::new();
    // Frames may be partial rectangles; composite onto a running canvas.
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut previous = canvas.clone();

    loop {
        let frame = match decoder.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => return Err(CodecError::UnsupportedImageData(e.to_string())),
        };
        let delay_ms = frame.delay as u32 * 10; // GIF delays are centiseconds

        if frame.dispose == gif::DisposalMethod::Previous {
            previous = canvas.clone();
        }

        let (left, top) = (frame.left as u32, frame.top as u32);
        let (frame_w, frame_h) = (frame.width as u32, frame.height as u32);
        for fy in 0..frame_h {
            for fx in 0..frame_w {
                let (cx, cy) = (left + fx, top + fy);
                if cx >= width || cy >= height {
                    continue;
                }
                let offset = ((fy * frame_w + fx) * 4) as usize;
                let pixel = &frame.buffer[offset..offset + 4];
                if pixel[3] > 0 {
                    canvas.put_pixel(cx, cy, Rgba([pixel[0], pixel[1], pixel[2], pixel[3]]));
                }
            }
        }

        frames.push(Frame {
            image: DynamicImage::ImageRgba8(canvas.clone()),
            delay_ms,
        });

        match frame.dispose {
            gif::DisposalMethod::Background => {
                for fy in 0..frame_h {
                    for fx in 0..frame_w {
                        let (cx, cy) = (left + fx, top + fy);
                        if cx < width && cy < height {
                            canvas.put_pixel(cx, cy, Rgba([0, 0, 0, 0]));
                        }
                    }
                }
            }
            gif::DisposalMethod::Previous => {
                canvas = previous.clone();
            }
            _ => {}
        }
    }

    debug!("decoded GIF: {} frames, {loop_count:?}", frames.len());
    match frames.len() {
        0 => Err(CodecError::UnsupportedImageData(
            "GIF contains no frames".into(),
        )),
        1 => Ok(Source::Still(
            frames.remove(0).image, // single frame behaves as a still image
        )),
        _ => Ok(Source::Animated(Sequence { frames, loop_count })),
    }
}

fn encode_gif(seq: &Sequence) -> Result<Encoded, CodecError> {
    let first = seq
        .frames
        .first()
        .ok_or_else(|| CodecError::Encode("empty frame sequence".into()))?;
    let (width, height) = (first.image.width(), first.image.height());
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(CodecError::Encode(format!(
            "frame dimensions {width}x{height} exceed the GIF maximum"
        )));
    }

    let mut bytes = Vec::new();
    {
        let mut encoder =
            gif::Encoder::new(Cursor::new(&mut bytes), width as u16, height as u16, &[])
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        let repeat = match seq.loop_count {
            LoopCount::Infinite => gif::Repeat::Infinite,
            LoopCount::Finite(count) => gif::Repeat::Finite(count),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        for frame in &seq.frames {
            let rgba = frame.image.to_rgba8();
            let (frame_w, frame_h) = rgba.dimensions();
            let mut raw = rgba.into_raw();
            let mut gif_frame =
                gif::Frame::from_rgba_speed(frame_w as u16, frame_h as u16, &mut raw, 10);
            gif_frame.delay = ((frame.delay_ms as f64) / 10.0).round() as u16;
            // Background disposal: frames must not linger under transparency
            gif_frame.dispose = gif::DisposalMethod::Background;
            encoder
                .write_frame(&gif_frame)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
    }

    debug!("encoded GIF: {} frames, {} bytes", seq.frames.len(), bytes.len());
    Ok(Encoded {
        bytes,
        format: EncodedFormat::Gif,
    })
}
