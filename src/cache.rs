//! Path-keyed byte cache mirrored under a root directory.
//!
//! An entry is simply the file at `<root>/<relative path>`; there is no index,
//! manifest or metadata. Entries are never evicted by this crate.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::OptimizerConfig;
use crate::error::CacheError;

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    enabled: bool,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            enabled,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.cache_location.clone(), config.cache)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Location of the entry for `path`.
    ///
    /// `..` pops the previous segment and stops at the root; root, prefix and
    /// `.` components are ignored. Two keys share an entry only when they
    /// resolve to the same relative path.
    pub fn mirrored_path(&self, path: &str) -> PathBuf {
        let mut segments = Vec::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => segments.push(part),
                Component::ParentDir => {
                    segments.pop();
                }
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            }
        }
        let mut mirrored = self.root.clone();
        mirrored.extend(segments);
        mirrored
    }

    /// Cached bytes for `path`, or `None` on a miss (including when caching is disabled).
    pub async fn try_read(&self, path: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if !self.enabled {
            return Ok(None);
        }
        let mirrored = self.mirrored_path(path);
        match tokio::fs::read(&mirrored).await {
            Ok(bytes) => {
                debug!(path, cached = %mirrored.display(), size = bytes.len(), "Cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path, cached = %mirrored.display(), "Cache miss");
                Ok(None)
            }
            Err(e) => {
                error!(error = ?e, path, cached = %mirrored.display(), "Failed to read cache entry");
                Err(CacheError::new("read", mirrored, e))
            }
        }
    }

    /// Stores `bytes` as the entry for `path`, creating parent directories as needed.
    pub async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let mirrored = self.mirrored_path(path);
        if let Some(parent) = mirrored.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(error = ?e, dir = %parent.display(), "Failed to create cache subdirectory");
                CacheError::new("mkdir", parent, e)
            })?;
        }
        tokio::fs::write(&mirrored, bytes).await.map_err(|e| {
            error!(error = ?e, path, cached = %mirrored.display(), "Failed to write cache entry");
            CacheError::new("write", &mirrored, e)
        })?;
        debug!(path, cached = %mirrored.display(), size = bytes.len(), "Cache entry written");
        Ok(())
    }
}

/// Creates the cache root when caching is enabled. Already existing is fine.
pub async fn ensure_cache_directory_exists(config: &OptimizerConfig) -> Result<(), CacheError> {
    if !config.cache {
        return Ok(());
    }
    let root = &config.cache_location;
    match tokio::fs::create_dir_all(root).await {
        Ok(()) => {
            info!(cache_location = %root.display(), "Cache directory ready");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, cache_location = %root.display(), "Failed to create cache directory");
            Err(CacheError::new("mkdir", root, e))
        }
    }
}
