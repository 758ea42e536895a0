//! Tests for the image codec.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use imgopt_codec::{CodecErrorKind, DecodedImage, ImageCodec, OutputFormat};
use imgopt_core::ImageExtension;
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

#[test]
fn test_decode_reports_dimensions() {
    let codec = ImageCodec::default();
    let jpeg = encoded(&gradient(1600, 1200), ImageFormat::Jpeg);

    let decoded = codec.decode(&jpeg).unwrap();
    assert_eq!(decoded.width(), 1600);
    assert_eq!(decoded.height(), 1200);
    assert_eq!(decoded.dimensions().to_string(), "1600x1200");
}

#[test]
fn test_decode_garbage_fails() {
    let codec = ImageCodec::default();
    let err = codec.decode(b"definitely not an image").unwrap_err();
    assert!(matches!(
        err.kind,
        CodecErrorKind::Decode(_) | CodecErrorKind::UnsupportedFormat(_)
    ));
}

#[test]
fn test_reduce_by_two_halves_each_side() {
    let codec = ImageCodec::default();
    let source = DecodedImage::new(gradient(1600, 1200));

    let reduced = codec.reduce_by(&source, 2).unwrap();
    assert_eq!((reduced.width(), reduced.height()), (800, 600));
}

#[test]
fn test_reduce_by_rounds_down_odd_sides() {
    let codec = ImageCodec::default();
    let source = DecodedImage::new(gradient(1001, 751));

    let reduced = codec.reduce_by(&source, 2).unwrap();
    assert_eq!((reduced.width(), reduced.height()), (500, 375));
}

#[test]
fn test_reduce_by_invalid_factor() {
    let codec = ImageCodec::default();
    let source = DecodedImage::new(gradient(4, 1));

    let zero = codec.reduce_by(&source, 0).unwrap_err();
    assert_eq!(
        zero.kind,
        CodecErrorKind::InvalidFactor {
            factor: 0,
            width: 4,
            height: 1,
        }
    );
}

#[test]
fn test_reduce_by_keeps_thin_sides_at_one_pixel() {
    let codec = ImageCodec::default();

    let banner = codec.reduce_by(&DecodedImage::new(gradient(1600, 1)), 2).unwrap();
    assert_eq!((banner.width(), banner.height()), (800, 1));

    let tiny = codec.reduce_by(&DecodedImage::new(gradient(1, 1)), 2).unwrap();
    assert_eq!((tiny.width(), tiny.height()), (1, 1));
}

/// Splice an APP1 EXIF segment carrying `orientation` in after the SOI marker.
fn with_exif_orientation(jpeg: &[u8], orientation: u8) -> Vec<u8> {
    let mut exif = b"Exif\0\0".to_vec();
    // Big-endian TIFF header, IFD0 at offset 8
    exif.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
    exif.extend_from_slice(&[0x00, 0x01]);
    // Tag 0x0112 (Orientation), SHORT, count 1, value
    exif.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    exif.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
    exif.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let length = (exif.len() + 2) as u16;
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[test]
fn test_decode_applies_exif_orientation() {
    let codec = ImageCodec::default();
    let landscape = encoded(&gradient(40, 20), ImageFormat::Jpeg);

    // 6 = rotate 90 clockwise
    let rotated = codec.decode(&with_exif_orientation(&landscape, 6)).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (20, 40));

    let upright = codec.decode(&with_exif_orientation(&landscape, 1)).unwrap();
    assert_eq!((upright.width(), upright.height()), (40, 20));

    let mobile = codec.reduce_by(&rotated, 2).unwrap();
    assert_eq!((mobile.width(), mobile.height()), (10, 20));
}

#[test]
fn test_encode_jpeg_round_trips_dimensions() {
    let codec = ImageCodec::new(85);
    let source = DecodedImage::new(gradient(320, 200));

    let bytes = codec.encode(&source, OutputFormat::Jpeg).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    assert_eq!(codec.decode(&bytes).unwrap().width(), 320);
}

#[test]
fn test_encode_jpeg_drops_alpha() {
    let codec = ImageCodec::default();
    let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 10])));

    let bytes = codec.encode(&DecodedImage::new(rgba), OutputFormat::Jpeg).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[test]
fn test_encode_png_is_lossless() {
    let codec = ImageCodec::default();
    let source = gradient(40, 30);

    let bytes = codec
        .encode(&DecodedImage::new(source.clone()), OutputFormat::Png)
        .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (40, 30));
    assert_eq!(decoded.to_rgb8(), source.to_rgb8());
}

#[test]
fn test_encode_webp_from_either_source() {
    let codec = ImageCodec::default();
    for format in [ImageFormat::Jpeg, ImageFormat::Png] {
        let source = codec.decode(&encoded(&gradient(64, 48), format)).unwrap();
        let bytes = codec.encode(&source, OutputFormat::WebP).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
        assert_eq!(codec.decode(&bytes).unwrap().height(), 48);
    }
}

#[test]
fn test_output_format_mapping() {
    assert_eq!(OutputFormat::for_source(ImageExtension::Jpeg), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::for_source(ImageExtension::Png), OutputFormat::Png);
    assert_eq!(OutputFormat::from_extension("JPEG"), Some(OutputFormat::Jpeg));
    assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::WebP));
    assert_eq!(OutputFormat::from_extension("gif"), None);
    assert_eq!(OutputFormat::WebP.content_type(), "image/webp");
}

#[test]
fn test_quality_is_clamped() {
    assert_eq!(ImageCodec::new(0).jpeg_quality(), 1);
    assert_eq!(ImageCodec::new(200).jpeg_quality(), 100);
}
