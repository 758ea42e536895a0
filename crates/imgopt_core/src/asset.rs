//! Canonical asset description.

use crate::naming::{KeyParts, NamingScheme, VariantKind};
use serde::{Deserialize, Serialize};

/// Raster format of a canonical asset, derived from its extension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    /// `.jpg` or `.jpeg`
    #[display("jpeg")]
    Jpeg,
    /// `.png`
    #[display("png")]
    Png,
}

impl ImageExtension {
    /// Map a file extension (without dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
            Some(ImageExtension::Jpeg)
        } else if extension.eq_ignore_ascii_case("png") {
            Some(ImageExtension::Png)
        } else {
            None
        }
    }

    /// MIME type written alongside objects of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageExtension::Jpeg => "image/jpeg",
            ImageExtension::Png => "image/png",
        }
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}x{}", width, height)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A stored canonical image.
///
/// Assets are only ever read by the pipeline. Dimensions start unknown and
/// are filled in once the bytes have been decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct Asset {
    /// Full object key
    path: String,
    /// Folder part of the key (empty at the bucket root)
    folder: String,
    /// File name without extension
    base_name: String,
    /// Source format
    extension: ImageExtension,
    /// Object size as reported by the listing
    byte_size: u64,
    /// Decoded dimensions, once known
    dimensions: Option<Dimensions>,
}

impl Asset {
    /// Build an asset from a listed key.
    ///
    /// Returns `None` unless `naming` classifies `key` as canonical.
    pub fn from_key(naming: &NamingScheme, key: &str, byte_size: u64) -> Option<Self> {
        if !naming.is_canonical(key) {
            return None;
        }
        let parts = KeyParts::parse(key)?;
        let extension = ImageExtension::from_extension(parts.extension)?;
        Some(Self {
            path: key.to_string(),
            folder: parts.folder.to_string(),
            base_name: parts.stem.to_string(),
            extension,
            byte_size,
            dimensions: None,
        })
    }

    /// Record decoded dimensions.
    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = Some(dimensions);
    }

    /// Variant key for `kind` under `naming`.
    pub fn variant_key(&self, naming: &NamingScheme, kind: VariantKind) -> Option<String> {
        naming.variant_key(&self.path, kind)
    }
}
