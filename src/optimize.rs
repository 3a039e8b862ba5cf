//! Batch driver: select -> process concurrently -> write back -> report.
//!
//! One call to [`optimize`] is one batch. It plays the host build tool for a
//! bundler output directory:
//!   - the files under `output_dir` are the bundle; improved assets are
//!     written back over the originals
//!   - with `include_public`, files from `public_dir` are processed where the
//!     host copied them (inside `output_dir`)
//!   - outcomes are gathered into fresh [`BatchResults`] and reported once
//!
//! # Error Handling
//! Only failing to create the cache root aborts the batch. Every per-file
//! failure, including writing an improved asset back, lands in the error map.

use std::collections::HashSet;
use std::path::Path;

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::cache::ensure_cache_directory_exists;
use crate::collect::{collect_files, list_relative_paths};
use crate::config::OptimizerConfig;
use crate::contract::{FileCandidate, TransformEngine};
use crate::error::OptimizeError;
use crate::process::{BatchResults, FileOutcome, Processor};
use crate::report::{log_errors, log_stats, RenderOptions, StatsReport};
use crate::select::{file_name_of, get_files_to_process};

/// Everything a finished batch produced.
#[derive(Debug)]
pub struct BatchReport {
    pub results: BatchResults,
    /// Paths (relative to `output_dir`) that were overwritten with smaller content.
    pub written: Vec<String>,
    /// `None` when stats logging is disabled or nothing succeeded.
    pub stats: Option<StatsReport>,
}

pub async fn optimize<E>(config: &OptimizerConfig, engine: E) -> Result<BatchReport, OptimizeError>
where
    E: TransformEngine,
{
    info!(output_dir = %config.output_dir.display(), "Starting optimisation batch");
    ensure_cache_directory_exists(config)
        .await
        .map_err(OptimizeError::CacheRoot)?;

    let processor = Processor::new(config, engine);
    let mut results = BatchResults::new();
    let mut written = Vec::new();

    let bundle = collect_files(&config.output_dir, &bundle_selection(config)).await;
    let outcomes = process_candidates(&processor, &bundle).await;
    write_back(&config.output_dir, &outcomes, &mut results, &mut written).await;

    let public = public_selection(config);
    if !public.is_empty() {
        let copies = collect_files(&config.output_dir, &public).await;
        let outcomes = process_candidates(&processor, &copies).await;
        write_back(&config.output_dir, &outcomes, &mut results, &mut written).await;
    }

    let render = RenderOptions {
        ansi_colors: config.ansi_colors,
    };
    let stats = if config.log_stats && !results.successes.is_empty() {
        Some(log_stats(&results, render))
    } else {
        None
    };
    if !results.errors.is_empty() {
        log_errors(&results, render);
    }

    info!(
        optimized = results.successes.len(),
        failed = results.errors.len(),
        written = written.len(),
        "Optimisation batch complete"
    );
    Ok(BatchReport {
        results,
        written,
        stats,
    })
}

/// Processes `candidates` concurrently. Outcomes come back in input order.
pub async fn process_candidates<E>(
    processor: &Processor<E>,
    candidates: &[FileCandidate],
) -> Vec<FileOutcome>
where
    E: TransformEngine,
{
    let tasks = candidates
        .iter()
        .map(|c| processor.process(&c.path, &c.content));
    join_all(tasks).await
}

/// Selected bundle paths under `output_dir`, minus the copies of public assets.
pub(crate) fn bundle_selection(config: &OptimizerConfig) -> Vec<String> {
    let public: HashSet<String> = config
        .public_dir
        .as_deref()
        .map(list_relative_paths)
        .unwrap_or_default()
        .into_iter()
        .collect();
    let bundle: Vec<String> = list_relative_paths(&config.output_dir)
        .into_iter()
        .filter(|path| {
            let from_public = public.contains(path);
            if from_public {
                debug!(path = %path, "Leaving public asset to the public pass");
            }
            !from_public
        })
        .collect();
    let selected = get_files_to_process(&bundle, file_name_of, &config.selection);
    info!(candidates = bundle.len(), selected = selected.len(), "Selected bundle assets");
    selected
}

/// Selected public assets whose copy exists in `output_dir`.
///
/// Empty unless `include_public` is set and a public directory is configured.
pub(crate) fn public_selection(config: &OptimizerConfig) -> Vec<String> {
    let public_dir = match (&config.public_dir, config.include_public) {
        (Some(dir), true) => dir,
        _ => return Vec::new(),
    };
    let all = list_relative_paths(public_dir);
    let selected: Vec<String> = get_files_to_process(&all, file_name_of, &config.selection)
        .into_iter()
        .filter(|path| {
            let present = config.output_dir.join(path).is_file();
            if !present {
                debug!(path = %path, "Public asset not present in output directory, skipping");
            }
            present
        })
        .collect();
    info!(
        public_dir = %public_dir.display(),
        candidates = all.len(),
        selected = selected.len(),
        "Selected public assets"
    );
    selected
}

/// Every path a batch would process: bundle first, then public copies.
pub fn selected_paths(config: &OptimizerConfig) -> Vec<String> {
    let mut paths = bundle_selection(config);
    paths.extend(public_selection(config));
    paths
}

/// Records every outcome and writes improved content over the originals.
async fn write_back(
    output_dir: &Path,
    outcomes: &[FileOutcome],
    results: &mut BatchResults,
    written: &mut Vec<String>,
) {
    for outcome in outcomes {
        results.record(outcome);
        let Some(content) = outcome.replacement() else {
            continue;
        };
        let target = output_dir.join(&outcome.path);
        match tokio::fs::write(&target, content).await {
            Ok(()) => {
                debug!(path = %outcome.path, size = content.len(), "Wrote optimized asset");
                written.push(outcome.path.clone());
            }
            Err(e) => {
                error!(error = ?e, path = %target.display(), "Failed to write optimized asset");
                results.record_error(
                    &outcome.path,
                    format!("failed to write {}: {e}", target.display()),
                );
            }
        }
    }
}
