//! Error types for the optimisation pipeline.
//!
//! Per-file failures ([`TransformError`], [`CacheError`]) are folded into a
//! [`ProcessError`] whose `Display` output is what ends up in the error report.
//! Only [`OptimizeError`] escapes a batch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`crate::contract::TransformEngine`].
#[derive(Debug, Error)]
pub enum TransformError {
    /// No engine command is configured for this file extension.
    #[error("no transform configured for extension `{extension}`")]
    UnsupportedFormat { extension: String },
    /// The engine process could not be started.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// Piping bytes to or from the engine failed.
    #[error("i/o with `{command}` failed: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
    /// The engine ran but reported failure.
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    /// The engine succeeded but returned no bytes.
    #[error("engine produced empty output")]
    EmptyOutput,
    #[error("{0}")]
    Other(String),
}

/// I/O failures against the cache directory tree.
#[derive(Debug, Error)]
#[error("cache {operation} failed for {}: {source}", path.display())]
pub struct CacheError {
    pub operation: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl CacheError {
    pub fn new(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Anything that can go wrong while processing a single file.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Batch-fatal failures.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The cache root could not be created, so nothing could be cached.
    #[error("could not create cache directory: {0}")]
    CacheRoot(#[source] CacheError),
}
