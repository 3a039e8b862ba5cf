use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, info};

use crate::contract::FormatOptions;
use crate::select::SelectionConfig;

/// Matches the raster and vector formats the pipeline cares about by default.
pub const DEFAULT_TEST_PATTERN: &str = r"(?i)\.(jpe?g|png|gif|tiff|webp|svg|avif)$";

pub const DEFAULT_CACHE_LOCATION: &str = ".cache/asset-squeeze";

/// Fully resolved configuration for one optimisation batch.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Bundler output directory; its files are the bundle.
    pub output_dir: PathBuf,
    /// Static assets the host copies verbatim into `output_dir`.
    pub public_dir: Option<PathBuf>,
    pub include_public: bool,
    pub selection: SelectionConfig,
    pub cache: bool,
    pub cache_location: PathBuf,
    /// Engine options keyed by lowercase extension.
    pub formats: HashMap<String, FormatOptions>,
    pub log_stats: bool,
    pub ansi_colors: bool,
}

impl OptimizerConfig {
    /// A config with every default applied and the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            public_dir: None,
            include_public: true,
            selection: SelectionConfig {
                include: None,
                exclude: None,
                test: Some(default_test_pattern()),
            },
            cache: false,
            cache_location: PathBuf::from(DEFAULT_CACHE_LOCATION),
            formats: HashMap::new(),
            log_stats: true,
            ansi_colors: true,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            public_dir = ?self.public_dir,
            include_public = self.include_public,
            cache = self.cache,
            cache_location = %self.cache_location.display(),
            formats = self.formats.len(),
            "Loaded OptimizerConfig"
        );
        debug!(?self, "OptimizerConfig loaded (full debug)");
    }
}

pub fn default_test_pattern() -> Regex {
    Regex::new(DEFAULT_TEST_PATTERN).expect("default test pattern is a valid regex")
}
