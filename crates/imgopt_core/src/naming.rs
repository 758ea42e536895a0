//! Asset naming scheme.
//!
//! Maps canonical object keys to their variant keys and back, and classifies
//! arbitrary keys as canonical, derived or ignored. Every function here is
//! total: any input string yields an answer, never a panic.
//!
//! The layout for a canonical `blog/2024/01/cover.jpg` is:
//!
//! ```text
//! blog/2024/01/cover@2x.jpg          Retina (same folder placement)
//! blog/2024/01/_retina/cover@2x.jpg  Retina (subscope placement)
//! blog/2024/01/_mobile/cover@2x.jpg  Mobile
//! blog/2024/01/cover.jpg.webp        AltFormat
//! ```
//!
//! Mobile keeps the `@2x` marker even though the image is half the retina
//! resolution. Existing sites link to these names, so the marker stays.

use crate::JunkPattern;
use serde::{Deserialize, Serialize};

/// Density marker inserted before the extension of retina and mobile variants.
pub const DENSITY_MARKER: &str = "@2x";

/// Folder segment holding retina variants when [`RetinaPlacement::Subscope`] is used.
pub const RETINA_SCOPE: &str = "_retina";

/// Folder segment holding mobile variants.
pub const MOBILE_SCOPE: &str = "_mobile";

/// Extension appended for the alternate compressed format.
pub const ALT_FORMAT_EXTENSION: &str = "webp";

/// Extensions accepted for canonical assets (compared case-insensitively).
const CANONICAL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Default folder segments that hold author avatars or static site assets.
const DEFAULT_EXCLUDED_SCOPES: &[&str] = &["authors", "avatars", "author-avatars", "static", "assets"];

/// Kind of derived image.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// 2x pixel density copy of the canonical image
    #[display("retina")]
    Retina,
    /// Half the linear dimensions of the retina image
    #[display("mobile")]
    Mobile,
    /// Canonical image re-encoded as WebP
    #[display("alt_format")]
    AltFormat,
}

/// What a stored object is, as far as the pipeline is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Original upload from which variants are derived
    #[display("canonical")]
    Canonical,
    /// Retina variant
    #[display("retina")]
    Retina,
    /// Mobile variant
    #[display("mobile")]
    Mobile,
    /// Alternate-format variant
    #[display("alt_format")]
    AltFormat,
    /// Not an image, junk, or inside an excluded scope
    #[display("ignored")]
    Ignored,
}

impl Classification {
    /// True for the three derived classifications.
    pub fn is_variant(&self) -> bool {
        matches!(
            self,
            Classification::Retina | Classification::Mobile | Classification::AltFormat
        )
    }
}

/// Where retina variants are written relative to their canonical asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetinaPlacement {
    /// `folder/base@2x.ext`
    #[default]
    SameFolder,
    /// `folder/_retina/base@2x.ext`
    Subscope,
}

/// An object key split into folder, file stem and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Everything before the last `/` (empty at the bucket root)
    pub folder: &'a str,
    /// File name without its final extension
    pub stem: &'a str,
    /// Final extension without the dot, original case preserved
    pub extension: &'a str,
}

impl<'a> KeyParts<'a> {
    /// Split `key` into parts. Returns `None` when the file name has no
    /// extension or an empty stem.
    pub fn parse(key: &'a str) -> Option<Self> {
        let (folder, file) = match key.rfind('/') {
            Some(idx) => (&key[..idx], &key[idx + 1..]),
            None => ("", key),
        };
        let dot = file.rfind('.')?;
        let (stem, extension) = (&file[..dot], &file[dot + 1..]);
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(Self {
            folder,
            stem,
            extension,
        })
    }

    /// Folder segments, skipping empty ones produced by leading or doubled slashes.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.folder.split('/').filter(|s| !s.is_empty())
    }
}

/// Joins a folder and a file name with a single `/`.
fn join(folder: &str, file: &str) -> String {
    if folder.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", folder, file)
    }
}

/// Naming rules for one deployment.
///
/// # Examples
///
/// ```
/// use imgopt_core::{Classification, NamingScheme, VariantKind};
///
/// let naming = NamingScheme::default();
/// let key = "blog/2024/01/cover.jpg";
///
/// assert_eq!(naming.classify(key), Classification::Canonical);
/// assert_eq!(
///     naming.variant_key(key, VariantKind::Mobile).as_deref(),
///     Some("blog/2024/01/_mobile/cover@2x.jpg")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct NamingScheme {
    /// Retina folder placement
    #[serde(default)]
    retina_placement: RetinaPlacement,

    /// Folder segments whose contents are never canonical
    #[serde(default = "default_excluded_scopes")]
    excluded_scopes: Vec<String>,
}

fn default_excluded_scopes() -> Vec<String> {
    DEFAULT_EXCLUDED_SCOPES.iter().map(|s| s.to_string()).collect()
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            retina_placement: RetinaPlacement::default(),
            excluded_scopes: default_excluded_scopes(),
        }
    }
}

impl NamingScheme {
    /// Create a scheme with explicit placement and excluded scopes.
    pub fn new(retina_placement: RetinaPlacement, excluded_scopes: Vec<String>) -> Self {
        Self {
            retina_placement,
            excluded_scopes,
        }
    }

    /// Returns a copy of this scheme with a different retina placement.
    pub fn with_retina_placement(mut self, placement: RetinaPlacement) -> Self {
        self.retina_placement = placement;
        self
    }

    /// Classify an object key.
    pub fn classify(&self, key: &str) -> Classification {
        if key.is_empty() || key.ends_with('/') {
            return Classification::Ignored;
        }
        if JunkPattern::detect(key).is_some() {
            return Classification::Ignored;
        }
        let Some(parts) = KeyParts::parse(key) else {
            return Classification::Ignored;
        };
        if self.is_excluded(&parts) {
            return Classification::Ignored;
        }

        if parts.extension.eq_ignore_ascii_case(ALT_FORMAT_EXTENSION) {
            return Classification::AltFormat;
        }
        if !is_canonical_extension(parts.extension) {
            return Classification::Ignored;
        }
        if parts.segments().any(|s| s == MOBILE_SCOPE) {
            return Classification::Mobile;
        }
        if parts.stem.contains(DENSITY_MARKER) || parts.segments().any(|s| s == RETINA_SCOPE) {
            return Classification::Retina;
        }
        Classification::Canonical
    }

    /// True when `key` is a canonical asset.
    pub fn is_canonical(&self, key: &str) -> bool {
        self.classify(key) == Classification::Canonical
    }

    /// Derive the variant key for a canonical `key`.
    ///
    /// Returns `None` when `key` is not canonical, so the function stays total.
    pub fn variant_key(&self, key: &str, kind: VariantKind) -> Option<String> {
        if !self.is_canonical(key) {
            return None;
        }
        let parts = KeyParts::parse(key)?;
        let retina_file = format!("{}{}.{}", parts.stem, DENSITY_MARKER, parts.extension);

        let derived = match kind {
            VariantKind::Retina => match self.retina_placement {
                RetinaPlacement::SameFolder => join(parts.folder, &retina_file),
                RetinaPlacement::Subscope => join(&join(parts.folder, RETINA_SCOPE), &retina_file),
            },
            VariantKind::Mobile => join(&join(parts.folder, MOBILE_SCOPE), &retina_file),
            VariantKind::AltFormat => format!("{}.{}", key, ALT_FORMAT_EXTENSION),
        };
        Some(derived)
    }

    /// Map a variant key back to its canonical source key and kind.
    ///
    /// Returns `None` for keys that are not variants under this scheme.
    pub fn source_key(&self, key: &str) -> Option<(String, VariantKind)> {
        let (candidate, kind) = match self.classify(key) {
            Classification::AltFormat => {
                let dot = key.rfind('.')?;
                (key[..dot].to_string(), VariantKind::AltFormat)
            }
            Classification::Mobile => {
                let parts = KeyParts::parse(key)?;
                let stem = parts.stem.strip_suffix(DENSITY_MARKER)?;
                let folder = strip_last_segment(parts.folder, MOBILE_SCOPE)?;
                (
                    join(folder, &format!("{}.{}", stem, parts.extension)),
                    VariantKind::Mobile,
                )
            }
            Classification::Retina => {
                let parts = KeyParts::parse(key)?;
                let stem = parts.stem.strip_suffix(DENSITY_MARKER)?;
                let folder = match self.retina_placement {
                    RetinaPlacement::SameFolder => parts.folder,
                    RetinaPlacement::Subscope => strip_last_segment(parts.folder, RETINA_SCOPE)?,
                };
                (
                    join(folder, &format!("{}.{}", stem, parts.extension)),
                    VariantKind::Retina,
                )
            }
            Classification::Canonical | Classification::Ignored => return None,
        };

        // Only a real round trip counts; this rejects e.g. `a@2x.jpg` under
        // subscope placement, which no canonical key derives.
        match self.variant_key(&candidate, kind) {
            Some(derived) if derived == key => Some((candidate, kind)),
            _ => None,
        }
    }

    fn is_excluded(&self, parts: &KeyParts<'_>) -> bool {
        parts
            .segments()
            .any(|segment| self.excluded_scopes.iter().any(|ex| ex == segment))
    }
}

/// True when `extension` is one of the canonical image extensions.
pub(crate) fn is_canonical_extension(extension: &str) -> bool {
    CANONICAL_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Removes `segment` when it is the final component of `folder`.
fn strip_last_segment<'a>(folder: &'a str, segment: &str) -> Option<&'a str> {
    if folder == segment {
        return Some("");
    }
    folder.strip_suffix(segment)?.strip_suffix('/')
}
