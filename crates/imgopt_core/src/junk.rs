//! Junk object patterns.
//!
//! Earlier runs and partial failures leave behind objects that look like
//! variants but are not: doubled markers, optimizer temp files, numbered
//! duplicates. They must be deleted before generation, otherwise an
//! existence check can mistake one for a valid variant.

use crate::naming::{ALT_FORMAT_EXTENSION, DENSITY_MARKER, MOBILE_SCOPE, RETINA_SCOPE};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use strum::IntoEnumIterator;

static DUPLICATE_NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@2x[-_]\d+\.[A-Za-z0-9]+$").expect("Valid duplicate suffix regex"));

/// A fixed category of junk object.
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
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum JunkPattern {
    /// `cover@2x@2x.jpg`
    #[display("doubled density marker")]
    DoubledDensity,
    /// `cover-optimized.jpg`, `cover.jpg.tmp`
    #[display("optimizer suffix")]
    OptimizerSuffix,
    /// `cover.jpg?ver=2`, `cover.jpg%3Fver=2`
    #[display("query string suffix")]
    QueryStringSuffix,
    /// `cover@2x-1.jpg`, `cover@2x_2.png`
    #[display("duplicate numeric suffix")]
    DuplicateNumericSuffix,
    /// `_mobile/cover@2x.jpg.webp`, `cover@2x.webp`
    #[display("misplaced alt-format file")]
    MisplacedAltFormat,
    /// `_mobile/_mobile/cover@2x.jpg`
    #[display("nested variant scope")]
    NestedVariantScope,
}

impl JunkPattern {
    /// True when `key` falls in this category.
    pub fn matches(self, key: &str) -> bool {
        match self {
            JunkPattern::DoubledDensity => key.contains("@2x@2x"),
            JunkPattern::OptimizerSuffix => {
                key.contains("-optimized.") || key.contains(".optimized.") || key.ends_with(".tmp")
            }
            JunkPattern::QueryStringSuffix => {
                key.contains('?') || key.contains("%3F") || key.contains("%3f")
            }
            JunkPattern::DuplicateNumericSuffix => DUPLICATE_NUMERIC_SUFFIX.is_match(key),
            JunkPattern::MisplacedAltFormat => {
                let is_alt = key
                    .rsplit_once('.')
                    .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(ALT_FORMAT_EXTENSION));
                is_alt
                    && (has_segment(key, MOBILE_SCOPE)
                        || has_segment(key, RETINA_SCOPE)
                        || key.contains(DENSITY_MARKER))
            }
            JunkPattern::NestedVariantScope => {
                let scopes = [MOBILE_SCOPE, RETINA_SCOPE];
                let segments: Vec<&str> = key.split('/').collect();
                segments
                    .windows(2)
                    .any(|pair| scopes.contains(&pair[0]) && scopes.contains(&pair[1]))
            }
        }
    }

    /// The first pattern `key` matches, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgopt_core::JunkPattern;
    ///
    /// assert_eq!(
    ///     JunkPattern::detect("blog/2024/01/cover@2x@2x.jpg"),
    ///     Some(JunkPattern::DoubledDensity)
    /// );
    /// assert_eq!(JunkPattern::detect("blog/2024/01/cover@2x.jpg"), None);
    /// ```
    pub fn detect(key: &str) -> Option<JunkPattern> {
        JunkPattern::iter().find(|pattern| pattern.matches(key))
    }
}

/// True when `segment` appears as a folder component of `key`.
fn has_segment(key: &str, segment: &str) -> bool {
    match key.rsplit_once('/') {
        Some((folder, _)) => folder.split('/').any(|s| s == segment),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_segment_ignores_file_name() {
        assert!(has_segment("a/_mobile/b.jpg", MOBILE_SCOPE));
        assert!(!has_segment("a/_mobile.jpg", MOBILE_SCOPE));
        assert!(!has_segment("_mobile", MOBILE_SCOPE));
    }

    #[test]
    fn duplicate_suffix_needs_marker() {
        assert!(JunkPattern::DuplicateNumericSuffix.matches("a/cover@2x-1.jpg"));
        assert!(JunkPattern::DuplicateNumericSuffix.matches("a/cover@2x_12.png"));
        assert!(!JunkPattern::DuplicateNumericSuffix.matches("a/2024-01-01.jpg"));
        assert!(!JunkPattern::DuplicateNumericSuffix.matches("a/cover-1.jpg"));
    }
}
