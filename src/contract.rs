//! # contract: the seam between the pipeline and its collaborators
//!
//! This module defines the [`TransformEngine`] trait and the plain data types
//! that cross it. The pipeline never transforms bytes itself; it hands each
//! selected file to an engine and only reasons about the sizes that come back.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers get a
//!   `MockTransformEngine` for deterministic tests (exported under the default
//!   `test-export-mocks` feature).
//!
//! ## Adding New Engines
//! - Implement the trait for your backend (in-process codec, remote service, ...).
//! - Convert every upstream failure into a [`TransformError`]; its message is
//!   shown to users verbatim in the error report.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// A file handed to the pipeline by the host: a relative path and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: String,
    pub content: Vec<u8>,
}

impl FileCandidate {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Per-format engine options, keyed in the config by lowercase file extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Program that reads the original bytes on stdin and writes the result to stdout.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Transforms the raw bytes of one file.
///
/// Implementations must be safe to call concurrently for different paths.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Transform `input` (the content of `path`) using the options for its format.
    async fn transform(
        &self,
        path: &str,
        input: &[u8],
        options: &FormatOptions,
    ) -> Result<Vec<u8>, TransformError>;
}
