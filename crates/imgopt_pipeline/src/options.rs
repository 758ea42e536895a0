//! Run options.

use derive_builder::Builder;
use derive_getters::Getters;
use imgopt_rate_limit::PipelineConfig;

/// Knobs for a single pipeline run.
///
/// # Examples
///
/// ```
/// use imgopt_pipeline::PipelineOptionsBuilder;
///
/// let options = PipelineOptionsBuilder::default()
///     .alt_format(true)
///     .dry_run(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(*options.width_threshold(), 1000);
/// assert!(*options.alt_format());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
pub struct PipelineOptions {
    /// Sources this wide or narrower get no retina or mobile variant.
    #[builder(default = "1000")]
    width_threshold: u32,

    /// Assets processed at once.
    #[builder(default = "8")]
    concurrency: usize,

    /// Generate alt-format (WebP) variants.
    #[builder(default)]
    alt_format: bool,

    /// Decide everything, write and delete nothing.
    #[builder(default)]
    dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            width_threshold: 1000,
            concurrency: 8,
            alt_format: false,
            dry_run: false,
        }
    }
}

impl PipelineOptions {
    /// Returns a copy with `dry_run` set.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns a copy with `alt_format` set.
    pub fn with_alt_format(mut self, alt_format: bool) -> Self {
        self.alt_format = alt_format;
        self
    }

    /// Returns a copy with `concurrency` set (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            width_threshold: config.width_threshold,
            concurrency: config.concurrency.max(1),
            alt_format: config.alt_format,
            dry_run: false,
        }
    }
}
