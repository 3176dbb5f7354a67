// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serbench CLI
//!
//! Command-line interface for benchmarking serialization codecs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Serbench - Concurrent serialization codec benchmark
#[derive(Parser)]
#[command(name = "serbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./serbench.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the benchmark for every configured format
    Run {
        /// Measured trials per sample and phase
        #[arg(short, long)]
        trials: Option<u64>,

        /// Comma-separated formats to run (e.g. JSON,XML)
        #[arg(short, long, value_delimiter = ',')]
        formats: Option<Vec<String>>,

        /// Directory for encoded scratch files
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Directory for the JSON report
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,

        /// Exit successfully even if some formats failed
        #[arg(long)]
        allow_failures: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },

    /// List available formats
    Formats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Run {
            trials,
            formats,
            scratch_dir,
            output,
            allow_failures,
        } => {
            let args = commands::run::RunArgs {
                trials,
                formats,
                scratch_dir,
                output,
                allow_failures,
            };
            commands::run::execute(cli.config.as_deref(), args).await
        }
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Formats => commands::formats::execute(),
    }
}
