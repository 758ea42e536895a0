//! Report rendering.

use super::OutputFormat;
use imgopt::{RunReport, VariantKind};
use std::fmt::Write;

/// Render a run report for stdout.
pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Human => Ok(render_human(report)),
    }
}

fn render_human(report: &RunReport) -> String {
    let mut out = String::new();
    let scope = if report.scope.prefix().is_empty() {
        "(bucket root)"
    } else {
        report.scope.prefix()
    };
    let _ = write!(out, "Scope: {}", scope);
    if report.dry_run {
        out.push_str(" (dry run, nothing written)");
    }
    out.push('\n');

    section(&mut out, "Purged", &report.purged);
    for kind in [VariantKind::Retina, VariantKind::Mobile, VariantKind::AltFormat] {
        let label = match kind {
            VariantKind::Retina => "Retina created",
            VariantKind::Mobile => "Mobile created",
            VariantKind::AltFormat => "WebP created",
        };
        section(&mut out, label, report.created(kind));
    }
    section(&mut out, "Below width threshold", &report.skipped_threshold);

    let _ = writeln!(out, "Canonical assets: {}", report.assets_seen);
    let _ = writeln!(out, "Variants already present: {}", report.skipped_existing);

    if !report.errors.is_empty() {
        let _ = writeln!(out, "Errors: {}", report.errors.len());
        for failure in &report.errors {
            match failure.kind {
                Some(kind) => {
                    let _ = writeln!(out, "  {} [{}]: {}", failure.key, kind, failure.cause);
                }
                None => {
                    let _ = writeln!(out, "  {}: {}", failure.key, failure.cause);
                }
            }
        }
    }
    if report.cancelled {
        out.push_str("Cancelled before every asset was processed\n");
    }
    out
}

fn section(out: &mut String, label: &str, keys: &[String]) {
    let _ = writeln!(out, "{}: {}", label, keys.len());
    for key in keys {
        let _ = writeln!(out, "  {}", key);
    }
}
