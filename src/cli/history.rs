//! History and show subcommands.

use crate::cli::OutputFormat;
use crate::output;
use crate::storage::ScanStore;
use anyhow::Context;
use clap::Parser;
use console::style;

/// List saved scans, newest first.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,
}

impl HistoryCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let store = ScanStore::new().context("opening scan history")?;
        let reports = store.list_recent(self.count)?;

        if reports.is_empty() {
            output::print_info("No saved scans.");
            return Ok(());
        }

        for report in reports {
            println!(
                "{}  {}  {}",
                style(report.id().short()).dim(),
                report.started_at().format("%Y-%m-%d %H:%M:%S"),
                report.summary()
            );
        }
        Ok(())
    }
}

/// Print a saved scan.
#[derive(Parser, Debug)]
pub struct ShowCommand {
    /// Scan ID or unique prefix of one
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Show closed ports in plain output
    #[arg(long)]
    pub show_closed: bool,
}

impl ShowCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let store = ScanStore::new().context("opening scan history")?;
        let report = store.find_by_prefix(&self.id)?;
        output::print_results(&report, self.output, self.show_closed)?;
        Ok(())
    }
}
