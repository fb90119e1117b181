//! Scan orchestration.
//!
//! Fans the port list out across a bounded pool of in-flight units, each one
//! a [`Scanner::scan_port`] call, and folds results into a [`ScanReport`] as
//! they complete.

pub mod probe;
pub mod rate_limiter;
pub mod tcp;
pub mod traits;

use crate::error::{ScanError, ScanResult};
use crate::report::{ReportBuilder, ScanReport};
use crate::types::{Port, PortSpec, ScanTarget};
use futures::future;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use probe::{probe, ConnectionOutcome};
pub use rate_limiter::RateLimiter;
pub use tcp::TcpConnectScanner;
pub use traits::{PortResult, PortState, Scanner};

/// Default number of simultaneously active units.
pub const DEFAULT_CONCURRENCY: usize = 100;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Parameters of one scan run, independent of how each port is scanned.
#[derive(Debug, Clone)]
pub struct ScanJobConfig {
    ports: Vec<Port>,
    concurrency: usize,
    rate_limit: u32,
    show_progress: bool,
    cancel: CancellationToken,
}

impl ScanJobConfig {
    pub fn new(ports: &PortSpec) -> Self {
        Self {
            ports: ports.ports().to_vec(),
            concurrency: DEFAULT_CONCURRENCY,
            rate_limit: 0,
            show_progress: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Cap on simultaneously active units. Must be at least 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Connection attempts per second, 0 for unlimited.
    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Draw a progress bar on stderr.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Stop submitting ports once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Scan `ports` on `target` with TCP connect, banner grabbing and the
/// built-in service tables.
pub async fn scan(
    target: ScanTarget,
    ports: &PortSpec,
    concurrency: usize,
    timeout: Duration,
) -> ScanResult<ScanReport> {
    let scanner = Arc::new(TcpConnectScanner::new(target.ip, timeout));
    let job = ScanJobConfig::new(ports).with_concurrency(concurrency);
    run_scan(target, scanner, job).await
}

/// Execute a complete scan.
///
/// Every submitted port yields exactly one result. After cancellation no new
/// port is submitted and in-flight units run to their own timeouts; the
/// report then holds only the submitted ports and is flagged as cancelled.
pub async fn run_scan(
    target: ScanTarget,
    scanner: Arc<dyn Scanner>,
    job: ScanJobConfig,
) -> ScanResult<ScanReport> {
    if job.concurrency == 0 {
        return Err(ScanError::InvalidConfig(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let total = job.ports.len();
    info!(
        host = %target,
        ports = total,
        concurrency = job.concurrency,
        timeout_ms = scanner.timeout().as_millis() as u64,
        "starting scan"
    );

    let progress = job.show_progress.then(|| progress_bar(total));
    let limiter = RateLimiter::new(job.rate_limit);
    let cancel = job.cancel;
    let mut builder = ReportBuilder::new(target, total);

    let mut results = stream::iter(job.ports)
        .take_while(|_| future::ready(!cancel.is_cancelled()))
        .map(|port| {
            let scanner = Arc::clone(&scanner);
            let limiter = limiter.clone();
            async move {
                if let Some(limiter) = limiter {
                    limiter.wait().await;
                }
                scanner.scan_port(port).await
            }
        })
        .buffer_unordered(job.concurrency);

    while let Some(result) = results.next().await {
        if let Some(pb) = &progress {
            pb.inc(1);
            if result.is_open() {
                pb.set_message(format!("Found open port: {}", result.port));
            }
        }
        builder.record(result);
    }

    let cancelled = builder.len() < total;
    if let Some(pb) = progress {
        if cancelled {
            pb.abandon_with_message("Scan cancelled");
        } else {
            pb.finish_with_message("Scan complete");
        }
    }

    let report = builder.finish(cancelled);
    if cancelled {
        warn!(scanned = report.len(), requested = total, "scan cancelled");
    }
    info!(
        open = report.count(PortState::Open),
        closed = report.count(PortState::Closed),
        filtered = report.count(PortState::Filtered),
        duration_ms = report.duration().num_milliseconds(),
        "scan finished"
    );

    Ok(report)
}

fn progress_bar(total: usize) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    ProgressBar::new(total as u64).with_style(style)
}
