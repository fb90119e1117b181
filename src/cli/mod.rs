//! CLI subcommand definitions and handlers.
//!
//! - `reconscan scan <target>` - Scan a target
//! - `reconscan history` - List saved scans
//! - `reconscan show <id>` - Print a saved scan

mod history;
mod scan;

pub use history::{HistoryCommand, ShowCommand};
pub use scan::ScanCommand;

use crate::config::AppSettings;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reconscan - concurrent TCP port scanner with banner grabbing.
#[derive(Parser, Debug)]
#[command(name = "reconscan")]
#[command(version)]
#[command(about = "TCP connect port scanner with banner grabbing and service identification")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs and a progress bar)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH", env = "RECONSCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// List saved scans
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Print a saved scan
    Show(ShowCommand),
}

impl Cli {
    /// Load settings from `--config` or the default location.
    pub fn settings(&self) -> anyhow::Result<AppSettings> {
        match &self.config {
            Some(path) => AppSettings::load_from(path)
                .with_context(|| format!("loading settings from {}", path.display())),
            None => AppSettings::load().context("loading settings"),
        }
    }

    /// Run the selected subcommand.
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        match &self.command {
            Commands::Scan(cmd) => cmd.execute(&settings, self.verbose, self.quiet).await,
            Commands::History(cmd) => cmd.execute(),
            Commands::Show(cmd) => cmd.execute(),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
