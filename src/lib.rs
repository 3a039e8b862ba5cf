#![doc = "asset-squeeze: build-time asset optimisation pipeline."]

//! Selects assets from a bundler's output, runs each through an external
//! transformation engine, caches results by path and reports size savings.
//!
//! # Usage
//! Drive a whole batch with [`optimize::optimize`], or compose the pieces:
//! [`select::get_files_to_process`], [`cache::ensure_cache_directory_exists`],
//! [`process::Processor`], [`report::log_stats`] and [`report::log_errors`].

pub mod cache;
pub mod cli;
pub mod collect;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod load_config;
pub mod matcher;
pub mod optimize;
pub mod process;
pub mod report;
pub mod select;

pub use cli::{run, Cli, Commands};
