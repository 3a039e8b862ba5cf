use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::engine::CommandEngine;
use crate::load_config::load_config;
use crate::optimize::{optimize, selected_paths};

/// CLI for asset-squeeze: shrink bundler output assets in place.
#[derive(Parser)]
#[clap(
    name = "asset-squeeze",
    version,
    about = "Optimise bundler output assets through external engines, with a path-keyed cache"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Optimise the configured output directory in place
    Optimize {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Print the assets a batch would optimise (bundle, then public copies), without touching them
    List {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Optimize { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "optimize", "Starting optimisation");
            match optimize(&config, CommandEngine::new()).await {
                Ok(report) => {
                    println!(
                        "Optimize complete: {} optimized, {} failed",
                        report.results.successes.len(),
                        report.results.errors.len()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "optimize", error = %e, "Optimisation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::List { config } => {
            let config = load_config(config)?;
            for path in selected_paths(&config) {
                println!("{path}");
            }
            Ok(())
        }
    }
}
