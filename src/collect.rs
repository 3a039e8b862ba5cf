//! Recursive directory walk producing the host's file list.
//!
//! Paths are reported relative to the walked root with `/` separators, which
//! is also the key format of the cache and the result maps.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info};

use crate::contract::FileCandidate;

/// Reads `paths` (relative to `root`) into candidates, keeping their order.
///
/// Files that are gone or unreadable are logged and left out.
pub async fn collect_files<S: AsRef<str>>(root: &Path, paths: &[S]) -> Vec<FileCandidate> {
    let mut candidates = Vec::with_capacity(paths.len());
    for rel_path in paths {
        let rel_path = rel_path.as_ref();
        let full_path = root.join(rel_path);
        match tokio::fs::read(&full_path).await {
            Ok(content) => {
                debug!(path = %rel_path, size = content.len(), "Collected file");
                candidates.push(FileCandidate::new(rel_path, content));
            }
            Err(e) => {
                error!(error = ?e, path = %full_path.display(), "Failed to read file while collecting");
            }
        }
    }
    info!(root = %root.display(), count = candidates.len(), "Collected files");
    candidates
}

/// Relative paths of every regular file under `root`, sorted.
pub fn list_relative_paths(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        debug!(root = %root.display(), "Directory does not exist, nothing to collect");
        return Vec::new();
    }

    fn visit_dir(dir: &Path, segments: &mut Vec<String>, results: &mut Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = ?e, dir = %dir.display(), "Failed to read directory, skipping subtree");
                return;
            }
        };
        for entry_res in entries {
            let entry = match entry_res {
                Ok(entry) => entry,
                Err(e) => {
                    error!(error = ?e, dir = %dir.display(), "Failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                segments.push(name);
                visit_dir(&path, segments, results);
                segments.pop();
            } else if path.is_file() {
                segments.push(name);
                results.push(segments.join("/"));
                segments.pop();
            }
        }
    }

    let mut results = Vec::new();
    visit_dir(root, &mut Vec::new(), &mut results);
    results.sort();
    results
}
