//! Output formats.

use imgopt_core::{ALT_FORMAT_EXTENSION, ImageExtension};

/// Encoded format of a written variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum OutputFormat {
    /// Lossy JPEG at the codec's configured quality
    #[display("jpeg")]
    Jpeg,
    /// Lossless PNG
    #[display("png")]
    Png,
    /// Lossless WebP, the alternate format
    #[display("webp")]
    WebP,
}

impl OutputFormat {
    /// Format a retina or mobile variant is written in: the source's own.
    pub fn for_source(extension: ImageExtension) -> Self {
        match extension {
            ImageExtension::Jpeg => OutputFormat::Jpeg,
            ImageExtension::Png => OutputFormat::Png,
        }
    }

    /// Map a file extension (without dot, any case).
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case(ALT_FORMAT_EXTENSION) {
            return Some(OutputFormat::WebP);
        }
        ImageExtension::from_extension(extension).map(Self::for_source)
    }

    /// MIME type for the written object.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}
