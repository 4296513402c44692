//! Command-line argument definitions.

use crate::config::EtlConfig;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for the NYC 311 warehouse transformation pipeline
///
/// Each subcommand runs one transformer over the raw extracts in the data
/// store and full-overwrites its processed output key(s). The external
/// scheduler invokes one subcommand per task; a nonzero exit reports the
/// task as failed.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nyc311-processor",
    version,
    about = "Transform NYC 311 complaints, NOAA weather and demographics extracts into star-schema CSVs"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory of the key->blob data store
    ///
    /// Overrides the NYC311_DATA_ROOT environment variable.
    #[arg(long = "data-root", value_name = "PATH", global = true)]
    pub data_root: Option<PathBuf>,

    /// Rows per batch when reading the complaint file
    #[arg(long = "chunk-size", value_name = "ROWS", global = true)]
    pub chunk_size: Option<usize>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,
}

/// One subcommand per transformer, mirroring the scheduler's task split
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Transform the raw 311 extract into the complaint fact table and
    /// the time dimension
    Complaints,
    /// Transform the raw NOAA observation blobs into the weather dimension
    Weather,
    /// Transform the demographics spreadsheet into the demographics
    /// dimension
    Demographics,
    /// Run all three transformers (independent, executed concurrently)
    All,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Resolve the run configuration: environment first, CLI overrides last.
    pub fn resolve_config(&self) -> Result<EtlConfig> {
        let mut config = EtlConfig::from_env()?;
        if let Some(root) = &self.data_root {
            config.data_root = root.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        config.validate()?;
        Ok(config)
    }
}
