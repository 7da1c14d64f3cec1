//! netheat CLI - Wireless survey field computation tool

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Wireless survey benchmark aggregation and heat-field computation.
#[derive(Parser)]
#[command(name = "netheat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the canonical metric registry
    Metrics,

    /// Summarize a survey document
    Inspect {
        /// Survey JSON file
        input: PathBuf,
    },

    /// Validate a survey document's configuration and results
    Validate {
        /// Survey JSON file
        input: PathBuf,
    },

    /// Compute interpolated fields for every configured graph
    Plot {
        /// Survey JSON file
        input: PathBuf,

        /// Floor-plan width in pixels
        #[arg(long)]
        width: u32,

        /// Floor-plan height in pixels
        #[arg(long)]
        height: u32,

        /// Grid cells per axis
        #[arg(long, default_value_t = netheat::DEFAULT_RESOLUTION)]
        resolution: usize,

        /// Output directory for per-metric JSON/CSV fields
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics => commands::metrics::run(cli.verbose),
        Commands::Inspect { input } => commands::inspect::run(input, cli.verbose),
        Commands::Validate { input } => commands::validate::run(input, cli.verbose),
        Commands::Plot {
            input,
            width,
            height,
            resolution,
            out,
        } => commands::plot::run(input, width, height, resolution, out, cli.verbose),
    }
}
