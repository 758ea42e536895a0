//! Decode, reduce and encode.

use crate::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageError, ImageReader};
use imgopt_core::Dimensions;
use imgopt_error::{CodecError, CodecErrorKind, CodecResult};
use std::io::Cursor;

fn decode_error(err: ImageError) -> CodecError {
    match err {
        ImageError::Unsupported(inner) => {
            CodecError::new(CodecErrorKind::UnsupportedFormat(inner.to_string()))
        }
        other => CodecError::new(CodecErrorKind::Decode(other.to_string())),
    }
}

/// A decoded pixel buffer and its dimensions.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct DecodedImage {
    /// Pixel dimensions
    dimensions: Dimensions,
    /// Pixel data
    image: DynamicImage,
}

impl DecodedImage {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage) -> Self {
        let dimensions = Dimensions {
            width: image.width(),
            height: image.height(),
        };
        Self { dimensions, image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }
}

/// Image codec with fixed encoder settings.
///
/// # Example
///
/// ```rust,ignore
/// let codec = ImageCodec::new(85);
/// let source = codec.decode(&bytes)?;
/// let mobile = codec.reduce_by(&source, 2)?;
/// let encoded = codec.encode(&mobile, OutputFormat::Jpeg)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCodec {
    jpeg_quality: u8,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self { jpeg_quality: 85 }
    }
}

impl ImageCodec {
    /// Create a codec. `jpeg_quality` is clamped to 1..=100.
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// JPEG quality in use.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Decode bytes in any enabled format, upright.
    ///
    /// An EXIF orientation tag is applied to the pixels, so a re-encoded
    /// variant (which carries no EXIF) displays the same way as its source.
    ///
    /// # Errors
    ///
    /// - `CodecErrorKind::UnsupportedFormat` for formats this build cannot read
    /// - `CodecErrorKind::Decode` for malformed input
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<DecodedImage> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::new(CodecErrorKind::Decode(e.to_string())))?
            .into_decoder()
            .map_err(decode_error)?;
        let orientation = decoder.orientation().map_err(decode_error)?;
        let mut image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
        image.apply_orientation(orientation);

        let decoded = DecodedImage::new(image);
        tracing::debug!(dimensions = %decoded.dimensions, ?orientation, "Decoded image");
        Ok(decoded)
    }

    /// Linear downscale by an integer `factor`.
    ///
    /// Sides round down but never below one pixel, so a 1600x1 banner
    /// reduces to 800x1.
    ///
    /// # Errors
    ///
    /// `CodecErrorKind::InvalidFactor` when `factor` is zero.
    pub fn reduce_by(&self, source: &DecodedImage, factor: u32) -> CodecResult<DecodedImage> {
        let Dimensions { width, height } = source.dimensions;
        if factor == 0 {
            return Err(CodecError::new(CodecErrorKind::InvalidFactor {
                factor,
                width,
                height,
            }));
        }

        let target_width = (width / factor).max(1);
        let target_height = (height / factor).max(1);

        let resized = source
            .image
            .resize_exact(target_width, target_height, FilterType::Lanczos3);
        Ok(DecodedImage::new(resized))
    }

    /// Encode into `format`.
    ///
    /// JPEG drops any alpha channel. WebP output is lossless.
    #[tracing::instrument(skip(self, source), fields(dimensions = %source.dimensions))]
    pub fn encode(&self, source: &DecodedImage, format: OutputFormat) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        let (width, height) = (source.width(), source.height());

        let result = match format {
            OutputFormat::Jpeg => {
                let rgb = source.image.to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            OutputFormat::Png => {
                // PNG has no float sample formats
                let converted;
                let image = match &source.image {
                    DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                        converted = DynamicImage::ImageRgba8(source.image.to_rgba8());
                        &converted
                    }
                    other => other,
                };
                PngEncoder::new(&mut buf).write_image(
                    image.as_bytes(),
                    width,
                    height,
                    image.color().into(),
                )
            }
            OutputFormat::WebP => {
                let rgba = source.image.to_rgba8();
                WebPEncoder::new_lossless(&mut buf).write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
            }
        };

        result.map_err(|e| CodecError::new(CodecErrorKind::Encode(format!("{}: {}", format, e))))?;
        tracing::debug!(%format, size = buf.len(), "Encoded image");
        Ok(buf)
    }
}
