//! End-to-end pipeline tests: decode → filter → encode over real bytes.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pixelfry::{Filter, FilterOutput, Source, codec};
use std::io::Cursor;

/// Encode a gradient RGBA image as PNG bytes.
fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Author an animated GIF whose frames are split into a red top band and
/// a blue bottom band — distinctive enough to survive palette rounding.
fn banded_gif_bytes(frame_count: usize, width: u16, height: u16, delay_cs: u16) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = gif::Encoder::new(Cursor::new(&mut bytes), width, height, &[]).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for _ in 0..frame_count {
            let image = RgbaImage::from_fn(width as u32, height as u32, |_, y| {
                if y < height as u32 / 2 {
                    Rgba([230, 20, 20, 255])
                } else {
                    Rgba([20, 20, 230, 255])
                }
            });
            let mut raw = image.into_raw();
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut raw, 10);
            frame.delay = delay_cs;
            frame.dispose = gif::DisposalMethod::Background;
            encoder.write_frame(&frame).unwrap();
        }
    }
    bytes
}

#[test]
fn pixelate_large_png_end_to_end() {
    let source = codec::decode(&png_bytes(1024, 1024)).unwrap();
    let output = Filter::Pixelate.apply(&source).unwrap();
    let encoded = codec::encode(&output).unwrap();

    assert_eq!(encoded.format, codec::EncodedFormat::Png);
    let Source::Still(image) = codec::decode(&encoded.bytes).unwrap() else {
        panic!("expected still output");
    };
    assert!(image.width() as u64 * image.height() as u64 <= 512 * 512);
    assert_eq!((image.width(), image.height()), (512, 512));
}

#[test]
fn flip_long_gif_end_to_end() {
    let bytes = banded_gif_bytes(150, 20, 20, 4);
    let source = codec::decode(&bytes).unwrap();
    assert_eq!(source.frame_count(), 150);

    let output = Filter::Flip.apply(&source).unwrap();
    let encoded = codec::encode(&output).unwrap();
    assert_eq!(encoded.format, codec::EncodedFormat::Gif);
    assert_eq!(encoded.format.extension(), "gif");

    let Source::Animated(seq) = codec::decode(&encoded.bytes).unwrap() else {
        panic!("expected animated output");
    };
    assert!(seq.frames.len() <= 100);

    // Every kept frame is vertically mirrored: red band now at the bottom
    for frame in &seq.frames {
        let rgba = frame.image.to_rgba8();
        let top = rgba.get_pixel(10, 2);
        let bottom = rgba.get_pixel(10, 17);
        assert!(top.0[2] > 150 && top.0[0] < 100, "top not blue: {top:?}");
        assert!(
            bottom.0[0] > 150 && bottom.0[2] < 100,
            "bottom not red: {bottom:?}"
        );
    }
}

#[test]
fn subsampled_gif_preserves_total_duration() {
    let bytes = banded_gif_bytes(150, 16, 16, 4); // 150 x 40ms = 6000ms
    let source = codec::decode(&bytes).unwrap();
    let output = Filter::Mirror.apply(&source).unwrap();

    let FilterOutput::Animated(seq) = &output else {
        panic!("expected animated output");
    };
    let total: u32 = seq.frames.iter().map(|f| f.delay_ms).sum();
    let drift = (total as i64 - 6000).abs();
    assert!(drift <= seq.frames.len() as i64, "duration drift {drift}ms");
}

#[test]
fn short_gif_keeps_every_frame() {
    let bytes = banded_gif_bytes(10, 16, 16, 5);
    let source = codec::decode(&bytes).unwrap();
    let output = Filter::Invert.apply(&source).unwrap();

    let FilterOutput::Animated(seq) = &output else {
        panic!("expected animated output");
    };
    assert_eq!(seq.frames.len(), 10);
    assert!(seq.frames.iter().all(|f| f.delay_ms == 50));
}

#[test]
fn still_input_never_becomes_animated() {
    let source = codec::decode(&png_bytes(64, 64)).unwrap();
    for filter in Filter::ALL {
        let output = filter.apply(&source).unwrap();
        assert!(
            matches!(output, FilterOutput::Still(_)),
            "{filter} produced a sequence from a still input"
        );
        let encoded = codec::encode(&output).unwrap();
        assert_eq!(encoded.format, codec::EncodedFormat::Png, "{filter}");
    }
}

#[test]
fn animated_input_stays_animated_per_filter() {
    let bytes = banded_gif_bytes(4, 24, 24, 6);
    let source = codec::decode(&bytes).unwrap();
    for filter in [Filter::Deepfry, Filter::Sepia, Filter::Grayscale, Filter::Wide] {
        let output = filter.apply(&source).unwrap();
        let FilterOutput::Animated(seq) = &output else {
            panic!("{filter} collapsed an animated input");
        };
        assert_eq!(seq.frames.len(), 4, "{filter}");
        let encoded = codec::encode(&output).unwrap();
        assert_eq!(encoded.format, codec::EncodedFormat::Gif, "{filter}");
    }
}

#[test]
fn encoded_bytes_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = banded_gif_bytes(3, 12, 12, 8);
    let source = codec::decode(&bytes).unwrap();
    let output = Filter::Blur.apply(&source).unwrap();
    let encoded = codec::encode(&output).unwrap();

    let path = dir
        .path()
        .join(format!("blur.{}", encoded.format.extension()));
    std::fs::write(&path, &encoded.bytes).unwrap();

    let reread = std::fs::read(&path).unwrap();
    let Source::Animated(seq) = codec::decode(&reread).unwrap() else {
        panic!("expected animated output");
    };
    assert_eq!(seq.frames.len(), 3);
}
