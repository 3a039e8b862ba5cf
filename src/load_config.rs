//! `load_config` module: loads a static YAML config and adapts it into the typed [`OptimizerConfig`].
//!
//! This module is the only place where user-supplied YAML is parsed and mapped to
//! domain types (compiled regexes, match rules, per-format options).
//!
//! # Responsibilities
//! - Parse the YAML file into loosely typed intermediate structs
//! - Map rule values to [`MatchRule`] variants, fail-closed for shapes it does not know
//! - Apply defaults and environment overrides (`ASSET_SQUEEZE_CACHE`, `ASSET_SQUEEZE_CACHE_LOCATION`)
//!
//! # Errors
//! All errors use `anyhow::Error` and surface at the CLI boundary. An invalid
//! regular expression is an error; an unrecognized rule shape is only a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{error, info, warn};

use crate::config::{OptimizerConfig, DEFAULT_CACHE_LOCATION, DEFAULT_TEST_PATTERN};
use crate::contract::FormatOptions;
use crate::matcher::MatchRule;
use crate::select::SelectionConfig;

pub const CACHE_ENV: &str = "ASSET_SQUEEZE_CACHE";
pub const CACHE_LOCATION_ENV: &str = "ASSET_SQUEEZE_CACHE_LOCATION";

#[derive(Debug, Deserialize)]
struct RawConfig {
    output_dir: PathBuf,
    #[serde(default)]
    public_dir: Option<PathBuf>,
    #[serde(default)]
    include_public: Option<bool>,
    #[serde(default)]
    include: Option<Value>,
    #[serde(default)]
    exclude: Option<Value>,
    #[serde(default)]
    test: Option<String>,
    #[serde(default)]
    cache: Option<bool>,
    #[serde(default)]
    cache_location: Option<PathBuf>,
    #[serde(default)]
    formats: HashMap<String, FormatOptions>,
    #[serde(default)]
    log_stats: Option<bool>,
    #[serde(default)]
    ansi_colors: Option<bool>,
}

/// Loads a YAML config file, applies defaults and environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<OptimizerConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config = parse_config(&config_content)?;
    config.trace_loaded();
    Ok(config)
}

/// Parses YAML text into an [`OptimizerConfig`]. Environment overrides apply here too.
pub fn parse_config(yaml: &str) -> Result<OptimizerConfig> {
    let raw: RawConfig = match serde_yaml::from_str(yaml) {
        Ok(conf) => {
            info!("Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let test_pattern = raw.test.as_deref().unwrap_or(DEFAULT_TEST_PATTERN);
    let test = Regex::new(test_pattern)
        .with_context(|| format!("Invalid `test` pattern: {test_pattern}"))?;

    let selection = SelectionConfig {
        include: raw.include.as_ref().map(|v| rule_from_yaml("include", v)).transpose()?,
        exclude: raw.exclude.as_ref().map(|v| rule_from_yaml("exclude", v)).transpose()?,
        test: Some(test),
    };

    let formats = raw
        .formats
        .into_iter()
        .map(|(ext, options)| (ext.trim_start_matches('.').to_lowercase(), options))
        .collect();

    let mut cache = raw.cache.unwrap_or(false);
    if let Ok(value) = std::env::var(CACHE_ENV) {
        cache = parse_bool(&value).with_context(|| format!("{CACHE_ENV} must be a boolean"))?;
        info!(cache, "Cache toggle overridden from environment");
    }
    let cache_location = match std::env::var(CACHE_LOCATION_ENV) {
        Ok(location) if !location.is_empty() => {
            info!(cache_location = %location, "Cache location overridden from environment");
            PathBuf::from(location)
        }
        _ => raw
            .cache_location
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_LOCATION)),
    };

    Ok(OptimizerConfig {
        output_dir: raw.output_dir,
        public_dir: raw.public_dir,
        include_public: raw.include_public.unwrap_or(true),
        selection,
        cache,
        cache_location,
        formats,
        log_stats: raw.log_stats.unwrap_or(true),
        ansi_colors: raw.ansi_colors.unwrap_or(true),
    })
}

/// Maps a YAML rule value to a [`MatchRule`].
///
/// A string is an exact name, a list of strings is a set, `{ pattern: <regex> }`
/// is a pattern. Anything else becomes [`MatchRule::Unrecognized`].
pub fn rule_from_yaml(key: &str, value: &Value) -> Result<MatchRule> {
    let rule = match value {
        Value::String(name) => MatchRule::Exact(name.clone()),
        Value::Sequence(items) => {
            let names: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            match names {
                Some(names) => MatchRule::set(names),
                None => unrecognized(key, value),
            }
        }
        Value::Mapping(map) => match map.get("pattern").and_then(Value::as_str) {
            Some(pattern) if map.len() == 1 => MatchRule::pattern(pattern)
                .with_context(|| format!("Invalid `{key}` pattern: {pattern}"))?,
            _ => unrecognized(key, value),
        },
        _ => unrecognized(key, value),
    };
    Ok(rule)
}

fn unrecognized(key: &str, value: &Value) -> MatchRule {
    let description = serde_yaml::to_string(value)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| format!("{value:?}"));
    warn!(key, rule = %description, "Unrecognized rule shape, it will match nothing");
    MatchRule::Unrecognized(description)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unsupported boolean value `{other}`"),
    }
}
