use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::cache::CacheStore;
use crate::config::OptimizerConfig;
use crate::contract::{FormatOptions, TransformEngine};
use crate::error::{ProcessError, TransformError};

/// Size accounting for one successfully processed file. Sizes are in KB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub size: f64,
    pub old_size: f64,
    /// Percent change in byte size, rounded down. Negative when the file shrank.
    pub ratio: i64,
    /// The transformed bytes were not smaller, so the original is kept.
    pub skip_write: bool,
    pub is_cached: bool,
}

/// What one file's pipeline produced.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    /// Transformed bytes; `None` when the file failed.
    pub content: Option<Vec<u8>>,
    pub skip_write: bool,
    pub result: Result<OutcomeRecord, String>,
}

impl FileOutcome {
    /// Bytes the host should emit in place of the original, if any.
    pub fn replacement(&self) -> Option<&[u8]> {
        match &self.content {
            Some(bytes) if !bytes.is_empty() && !self.skip_write => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

/// Per-batch result maps, in the order outcomes were recorded.
///
/// A path has an entry in at most one of the two maps.
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successes: IndexMap<String, OutcomeRecord>,
    pub errors: IndexMap<String, String>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        match &outcome.result {
            Ok(record) => self.record_success(&outcome.path, record.clone()),
            Err(message) => self.record_error(&outcome.path, message.clone()),
        }
    }

    pub fn record_success(&mut self, path: &str, record: OutcomeRecord) {
        self.errors.shift_remove(path);
        self.successes.insert(path.to_string(), record);
    }

    pub fn record_error(&mut self, path: &str, message: String) {
        self.successes.shift_remove(path);
        self.errors.insert(path.to_string(), message);
    }

    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }
}

/// Runs single files through cache lookup, transformation and size accounting.
pub struct Processor<E> {
    cache: CacheStore,
    formats: HashMap<String, FormatOptions>,
    engine: E,
}

impl<E: TransformEngine> Processor<E> {
    pub fn new(config: &OptimizerConfig, engine: E) -> Self {
        Self {
            cache: CacheStore::from_config(config),
            formats: config.formats.clone(),
            engine,
        }
    }

    /// Processes one file. Never fails: errors are captured in the outcome.
    pub async fn process(&self, path: &str, original: &[u8]) -> FileOutcome {
        match self.try_process(path, original).await {
            Ok((content, record)) => {
                info!(
                    path,
                    ratio = record.ratio,
                    skip_write = record.skip_write,
                    is_cached = record.is_cached,
                    "Processed file"
                );
                match serde_json::to_string(&record) {
                    Ok(json) => debug!(path, record = %json, "Outcome record"),
                    Err(e) => error!(path, error = ?e, "Failed to serialize outcome record"),
                }
                FileOutcome {
                    path: path.to_string(),
                    content: Some(content),
                    skip_write: record.skip_write,
                    result: Ok(record),
                }
            }
            Err(e) => {
                error!(path, error = %e, "Processing failed");
                FileOutcome {
                    path: path.to_string(),
                    content: None,
                    skip_write: false,
                    result: Err(e.to_string()),
                }
            }
        }
    }

    async fn try_process(
        &self,
        path: &str,
        original: &[u8],
    ) -> Result<(Vec<u8>, OutcomeRecord), ProcessError> {
        let (content, is_cached) = match self.cache.try_read(path).await? {
            // An empty entry is never written here, so it is treated as a miss.
            Some(bytes) if !bytes.is_empty() => (bytes, true),
            _ => {
                let extension = extension_of(path);
                let fallback = FormatOptions::default();
                let options = self.formats.get(&extension).unwrap_or(&fallback);
                debug!(path, extension = %extension, "Transforming");
                let bytes = self.engine.transform(path, original, options).await?;
                if bytes.is_empty() {
                    return Err(TransformError::EmptyOutput.into());
                }
                if self.cache.is_enabled() {
                    self.cache.write(path, &bytes).await?;
                }
                (bytes, false)
            }
        };

        let new_size = content.len();
        let old_size = original.len();
        let record = OutcomeRecord {
            size: kilobytes(new_size),
            old_size: kilobytes(old_size),
            ratio: ratio(new_size, old_size),
            skip_write: new_size >= old_size,
            is_cached,
        };
        Ok((content, record))
    }
}

/// Lowercase extension of the file name in `path`, or an empty string.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// `floor(100 * (new / old - 1))`, computed exactly. An empty original yields 0.
pub fn ratio(new_size: usize, old_size: usize) -> i64 {
    if old_size == 0 {
        return 0;
    }
    let new_size = new_size as i128;
    let old_size = old_size as i128;
    (100 * (new_size - old_size)).div_euclid(old_size) as i64
}

fn kilobytes(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}
