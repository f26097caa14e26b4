//! Command-line interface definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stampede")]
#[command(about = "Drive load tests against HTTP services", version)]
pub struct Cli {
    /// Path to the engine configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test described by a plan file
    Run {
        /// Path to the test plan (YAML)
        #[arg(short, long)]
        plan: PathBuf,

        /// Bearer token injected into every request
        #[arg(long)]
        auth_token: Option<String>,

        /// Output format for the stored result
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,
    },

    /// Validate a plan file without running it
    Validate {
        /// Path to the test plan (YAML)
        #[arg(short, long)]
        plan: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full stored record as JSON
    Json,
}
