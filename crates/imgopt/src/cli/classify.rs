//! Classify command handler.

use imgopt::{Classification, JunkPattern, NamingScheme, VariantKind};
use std::fmt::Write;

/// One block of text describing how `key` is treated.
///
/// Canonical keys list their variant keys; variants name their source; junk
/// names the pattern that matched.
pub fn describe_key(naming: &NamingScheme, key: &str) -> String {
    let classification = naming.classify(key);
    let mut out = format!("{}: {}", key, classification);

    match classification {
        Classification::Canonical => {
            for kind in [VariantKind::Retina, VariantKind::Mobile, VariantKind::AltFormat] {
                if let Some(variant) = naming.variant_key(key, kind) {
                    let _ = write!(out, "\n  {:<10} {}", kind.to_string(), variant);
                }
            }
        }
        Classification::Ignored => {
            if let Some(pattern) = JunkPattern::detect(key) {
                let _ = write!(out, " (junk: {})", pattern);
            }
        }
        variant if variant.is_variant() => {
            if let Some((source, _)) = naming.source_key(key) {
                let _ = write!(out, " (from {})", source);
            }
        }
        _ => {}
    }
    out
}
