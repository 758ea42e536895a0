//! Per-run report.
//!
//! A [`RunReport`] is built fresh by each pipeline invocation and handed to
//! the caller. Nothing in it is shared between runs.

use crate::{Dimensions, DirectoryScope, VariantKind};
use serde::Serialize;

/// What happened to one variant of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VariantOutcome {
    /// Variant was written (or would have been, in a dry run)
    Created {
        /// Variant key
        key: String,
    },
    /// Source is too narrow to derive a high-density variant
    SkippedThreshold {
        /// Decoded source width
        width: u32,
    },
    /// Variant already present
    SkippedExists {
        /// Variant key
        key: String,
    },
    /// Variant kind not enabled for this run
    Disabled,
    /// Generation failed; other variants and assets are unaffected
    Failed {
        /// Human-readable cause
        cause: String,
    },
}

impl VariantOutcome {
    /// Key of the created variant, if one was created.
    pub fn created_key(&self) -> Option<&str> {
        match self {
            VariantOutcome::Created { key } => Some(key),
            _ => None,
        }
    }

    /// True for [`VariantOutcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, VariantOutcome::Failed { .. })
    }
}

/// Outcome of processing a single canonical asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetOutcome {
    /// Canonical asset key
    pub key: String,
    /// Decoded dimensions, when the asset had to be decoded
    pub dimensions: Option<Dimensions>,
    /// Retina pass result
    pub retina: VariantOutcome,
    /// Mobile pass result
    pub mobile: VariantOutcome,
    /// Alt-format pass result
    pub alt_format: VariantOutcome,
}

impl AssetOutcome {
    /// A fresh outcome with every pass disabled.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dimensions: None,
            retina: VariantOutcome::Disabled,
            mobile: VariantOutcome::Disabled,
            alt_format: VariantOutcome::Disabled,
        }
    }

    /// Outcome for `kind`.
    pub fn outcome(&self, kind: VariantKind) -> &VariantOutcome {
        match kind {
            VariantKind::Retina => &self.retina,
            VariantKind::Mobile => &self.mobile,
            VariantKind::AltFormat => &self.alt_format,
        }
    }

    /// Mutable outcome slot for `kind`.
    pub fn outcome_mut(&mut self, kind: VariantKind) -> &mut VariantOutcome {
        match kind {
            VariantKind::Retina => &mut self.retina,
            VariantKind::Mobile => &mut self.mobile,
            VariantKind::AltFormat => &mut self.alt_format,
        }
    }

    /// Mark every pass that has not run yet as failed with `cause`.
    ///
    /// Used when the source itself cannot be read or decoded.
    pub fn fail_pending(&mut self, kinds: &[VariantKind], cause: &str) {
        for kind in kinds {
            let slot = self.outcome_mut(*kind);
            if matches!(slot, VariantOutcome::Disabled) {
                *slot = VariantOutcome::Failed {
                    cause: cause.to_string(),
                };
            }
        }
    }
}

/// A failed key with enough detail to retry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    /// Canonical asset key, or the junk key for purge failures
    pub key: String,
    /// Variant pass that failed, if the failure is variant-specific
    pub kind: Option<VariantKind>,
    /// Human-readable cause
    pub cause: String,
}

/// Result of one pipeline invocation.
///
/// # Examples
///
/// ```
/// use imgopt_core::{AssetOutcome, DirectoryScope, RunReport, VariantOutcome};
///
/// let mut report = RunReport::new(DirectoryScope::new("blog/2024/01"), false);
/// let mut outcome = AssetOutcome::new("blog/2024/01/cover.jpg");
/// outcome.retina = VariantOutcome::Created { key: "blog/2024/01/cover@2x.jpg".into() };
/// report.record(outcome);
///
/// assert_eq!(report.retina_created, vec!["blog/2024/01/cover@2x.jpg".to_string()]);
/// assert!(report.errors.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Scope the run covered
    pub scope: DirectoryScope,
    /// True when nothing was written or deleted
    pub dry_run: bool,
    /// True when cancellation stopped the run before every asset started
    pub cancelled: bool,
    /// Number of canonical assets found in the scope
    pub assets_seen: usize,
    /// Junk keys deleted before generation
    pub purged: Vec<String>,
    /// Retina variants created
    pub retina_created: Vec<String>,
    /// Mobile variants created
    pub mobile_created: Vec<String>,
    /// Alt-format variants created
    pub altformat_created: Vec<String>,
    /// Assets below the width threshold
    pub skipped_threshold: Vec<String>,
    /// Variants that already existed
    pub skipped_existing: usize,
    /// Failures, one per failed key and pass
    pub errors: Vec<AssetFailure>,
    /// Per-asset detail
    pub assets: Vec<AssetOutcome>,
}

impl RunReport {
    /// An empty report for `scope`.
    pub fn new(scope: DirectoryScope, dry_run: bool) -> Self {
        Self {
            scope,
            dry_run,
            cancelled: false,
            assets_seen: 0,
            purged: Vec::new(),
            retina_created: Vec::new(),
            mobile_created: Vec::new(),
            altformat_created: Vec::new(),
            skipped_threshold: Vec::new(),
            skipped_existing: 0,
            errors: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Fold one asset's outcome into the aggregate lists.
    pub fn record(&mut self, outcome: AssetOutcome) {
        let mut below_threshold = false;
        for kind in [VariantKind::Retina, VariantKind::Mobile, VariantKind::AltFormat] {
            match outcome.outcome(kind) {
                VariantOutcome::Created { key } => self.created_mut(kind).push(key.clone()),
                VariantOutcome::SkippedExists { .. } => self.skipped_existing += 1,
                VariantOutcome::SkippedThreshold { .. } => below_threshold = true,
                VariantOutcome::Failed { cause } => self.errors.push(AssetFailure {
                    key: outcome.key.clone(),
                    kind: Some(kind),
                    cause: cause.clone(),
                }),
                VariantOutcome::Disabled => {}
            }
        }
        if below_threshold {
            self.skipped_threshold.push(outcome.key.clone());
        }
        self.assets.push(outcome);
    }

    /// Record a failure not tied to a variant pass (e.g. a purge delete).
    pub fn record_failure(&mut self, key: impl Into<String>, cause: impl Into<String>) {
        self.errors.push(AssetFailure {
            key: key.into(),
            kind: None,
            cause: cause.into(),
        });
    }

    /// Created keys for `kind`.
    pub fn created(&self, kind: VariantKind) -> &[String] {
        match kind {
            VariantKind::Retina => &self.retina_created,
            VariantKind::Mobile => &self.mobile_created,
            VariantKind::AltFormat => &self.altformat_created,
        }
    }

    fn created_mut(&mut self, kind: VariantKind) -> &mut Vec<String> {
        match kind {
            VariantKind::Retina => &mut self.retina_created,
            VariantKind::Mobile => &mut self.mobile_created,
            VariantKind::AltFormat => &mut self.altformat_created,
        }
    }

    /// Total variants created across all kinds.
    pub fn total_created(&self) -> usize {
        self.retina_created.len() + self.mobile_created.len() + self.altformat_created.len()
    }

    /// Distinct keys that failed, in first-seen order. Re-running over just
    /// these keys retries the failed subset.
    pub fn failed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for failure in &self.errors {
            if !keys.contains(&failure.key.as_str()) {
                keys.push(&failure.key);
            }
        }
        keys
    }

    /// Sort every key list so reports from concurrent runs compare equal.
    pub fn sort(&mut self) {
        self.purged.sort();
        self.retina_created.sort();
        self.mobile_created.sort();
        self.altformat_created.sort();
        self.skipped_threshold.sort();
        self.errors.sort_by(|a, b| a.key.cmp(&b.key).then(a.kind.cmp(&b.kind)));
        self.assets.sort_by(|a, b| a.key.cmp(&b.key));
    }
}
