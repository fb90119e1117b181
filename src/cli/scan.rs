//! Scan subcommand implementation.

use crate::banner::BannerConfig;
use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::output;
use crate::scanner::{run_scan, ScanJobConfig, TcpConnectScanner};
use crate::storage::ScanStore;
use crate::types::{PortSpec, ScanTarget};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Scan a target for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP address or hostname)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g. "80", "80,443", "1-1000", "22,80,8000-9000"); common ports if omitted
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Maximum number of simultaneously active probes
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Banner read timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub banner_timeout: Option<u64>,

    /// Skip banner grabbing on open ports
    #[arg(long)]
    pub no_banner: bool,

    /// Connection attempts per second (0 = unlimited)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Also write the report as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Show closed ports in plain output
    #[arg(long)]
    pub show_closed: bool,

    /// Don't save the scan to the history
    #[arg(long)]
    pub no_save: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(
        &self,
        settings: &AppSettings,
        verbose: bool,
        quiet: bool,
    ) -> anyhow::Result<()> {
        // Both setup steps are fatal and happen before any probe is sent.
        let port_spec = PortSpec::parse(self.ports.as_deref().unwrap_or(&settings.default_ports))
            .context("invalid port specification")?;
        let target = ScanTarget::resolve(&self.target).await?;

        let concurrency = self.concurrency.unwrap_or(settings.default_concurrency);
        let timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.timeout());
        let banner_timeout = self
            .banner_timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.banner_timeout());
        let grab_banners = settings.grab_banners && !self.no_banner;

        let plain = self.output == OutputFormat::Plain;
        if !quiet && plain {
            output::print_scan_header(&target.input, &target.ip.to_string(), port_spec.len());
        }

        let banner =
            grab_banners.then(|| BannerConfig::default().with_read_timeout(banner_timeout));
        let scanner = Arc::new(TcpConnectScanner::new(target.ip, timeout).with_banner(banner));

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, no further ports will be submitted");
                ctrl_c.cancel();
            }
        });

        let mut job = ScanJobConfig::new(&port_spec)
            .with_concurrency(concurrency)
            .with_rate_limit(self.rate_limit.unwrap_or(settings.default_rate_limit))
            .with_cancel(cancel);
        if verbose {
            job = job.with_progress();
        }

        let report = run_scan(target, scanner, job).await?;

        if report.cancelled() && !quiet {
            output::print_warning(&format!(
                "scan interrupted: {} of {} ports scanned",
                report.len(),
                report.ports_requested()
            ));
        }

        if settings.auto_save_scans && !self.no_save {
            let store = ScanStore::new().context("opening scan history")?;
            store.save(&report).context("saving scan")?;
            if !quiet && plain {
                output::print_info(&format!("Scan saved as {}", report.id().short()));
            }
        }

        output::print_results(&report, self.output, self.show_closed)?;

        if let Some(path) = &self.output_file {
            output::write_json_file(path, &report)
                .with_context(|| format!("writing {}", path.display()))?;
            if !quiet && plain {
                output::print_success(&format!("Results saved to {}", path.display()));
            }
        }

        Ok(())
    }
}
