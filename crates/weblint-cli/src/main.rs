//! weblint CLI tool.
//!
//! Usage:
//! ```bash
//! weblint check [OPTIONS] [PATHS]...
//! weblint setup [--force]
//! weblint list-linters
//! weblint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Runs ESLint, TSLint, CoffeeLint and CSS Lint with one diagnostic format
#[derive(Parser)]
#[command(name = "weblint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "WEBLINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint files and directories
    Check {
        /// Files or directories to lint (default: current directory)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific linters (comma-separated, e.g. eslint,csslint)
        #[arg(long)]
        linters: Option<String>,
    },

    /// Install the linter environment now instead of on first check
    Setup {
        /// Rebuild even if the environment is valid
        #[arg(long)]
        force: bool,
    },

    /// List supported linters
    ListLinters,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Check {
            paths,
            format,
            linters,
        } => commands::check::run(&paths, format, linters.as_deref(), cli.config.as_deref()),
        Commands::Setup { force } => {
            let config = config_resolver::load(&cwd, cli.config.as_deref())?;
            commands::setup::run(&config, force)
        }
        Commands::ListLinters => {
            let config = config_resolver::load(&cwd, cli.config.as_deref())?;
            commands::list_linters::run(&config);
            Ok(())
        }
        Commands::Init { force } => commands::init::run(&cwd, force),
    }
}
