//! Tests for junk pattern detection.

use imgopt_core::{JunkPattern, NamingScheme, VariantKind};
use strum::IntoEnumIterator;

#[test]
fn test_each_pattern_detects_its_example() {
    let cases = [
        ("blog/cover@2x@2x.jpg", JunkPattern::DoubledDensity),
        ("blog/cover-optimized.jpg", JunkPattern::OptimizerSuffix),
        ("blog/cover.jpg.tmp", JunkPattern::OptimizerSuffix),
        ("blog/cover.jpg?ver=2", JunkPattern::QueryStringSuffix),
        ("blog/cover.jpg%3Fver=2", JunkPattern::QueryStringSuffix),
        ("blog/cover@2x-1.jpg", JunkPattern::DuplicateNumericSuffix),
        ("blog/_mobile/cover@2x.jpg.webp", JunkPattern::MisplacedAltFormat),
        ("blog/cover@2x.webp", JunkPattern::MisplacedAltFormat),
        ("blog/_mobile/_mobile/cover@2x.jpg", JunkPattern::NestedVariantScope),
        ("blog/_retina/_mobile/cover@2x.jpg", JunkPattern::NestedVariantScope),
    ];

    for (key, expected) in cases {
        assert_eq!(JunkPattern::detect(key), Some(expected), "{}", key);
    }
}

#[test]
fn test_legitimate_objects_are_not_junk() {
    let naming = NamingScheme::default();
    let canonical = "blog/2024/01/cover.jpg";
    assert_eq!(JunkPattern::detect(canonical), None);
    for kind in VariantKind::iter() {
        let derived = naming.variant_key(canonical, kind).unwrap();
        assert_eq!(JunkPattern::detect(&derived), None, "{}", derived);
    }
    assert_eq!(JunkPattern::detect("blog/2024-01-01.jpg"), None);
}

#[test]
fn test_every_pattern_has_display() {
    for pattern in JunkPattern::iter() {
        assert!(!pattern.to_string().is_empty());
    }
}
