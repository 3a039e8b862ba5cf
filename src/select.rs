//! Picks the subset of candidate paths the pipeline should touch.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::matcher::{matches, MatchRule};

/// Selection criteria. `include`, when present, overrides `exclude` and `test`.
#[derive(Debug, Clone, Default)]
pub struct SelectionConfig {
    pub include: Option<MatchRule>,
    pub exclude: Option<MatchRule>,
    pub test: Option<Regex>,
}

/// Default name extractor: the last component of `path` (file name with extension).
pub fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Filters `all_paths` down to the ones whose derived name satisfies `config`.
///
/// The filter is stable: selected paths keep their input order.
pub fn get_files_to_process<S, F>(all_paths: &[S], name_of: F, config: &SelectionConfig) -> Vec<String>
where
    S: AsRef<str>,
    F: Fn(&str) -> String,
{
    let selected: Vec<String> = all_paths
        .iter()
        .map(|path| path.as_ref())
        .filter(|path| is_selected(&name_of(*path), config))
        .map(str::to_string)
        .collect();

    debug!(
        candidates = all_paths.len(),
        selected = selected.len(),
        include_mode = config.include.is_some(),
        "Selected files to process"
    );
    selected
}

fn is_selected(name: &str, config: &SelectionConfig) -> bool {
    if let Some(include) = &config.include {
        return matches(name, Some(include));
    }
    let passes_test = config.test.as_ref().is_some_and(|re| re.is_match(name));
    passes_test && !matches(name, config.exclude.as_ref())
}
