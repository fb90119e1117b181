//! # reconscan - Concurrent TCP Port Scanner
//!
//! reconscan probes a single host with full TCP connect attempts, classifies
//! each port as open, closed or filtered, reads a short banner from open
//! ports and names the service behind them.
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most N probes in flight at any moment
//! - **Banner grabbing**: passive read, with an HTTP request for web ports
//! - **Service identification**: banner signatures first, well-known ports second
//! - **Cancellation**: stop submitting new ports, let in-flight ones finish
//! - **Result persistence**: scans saved as JSON and listed from the history
//! - **Multiple output formats**: plain text, JSON and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use reconscan::{scan, PortSpec, ScanTarget};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ScanTarget::resolve("scanme.example").await?;
//!     let ports = PortSpec::parse("22,80,443")?;
//!
//!     let report = scan(target, &ports, 100, Duration::from_secs(1)).await?;
//!     for result in report.open_ports() {
//!         println!("{} {:?}", result.port, result.service);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port specifications, targets and scan IDs
//! - [`scanner`] - Connect probe, the `Scanner` trait and the scan orchestrator
//! - [`banner`] - Banner extraction from open connections
//! - [`services`] - Signature and well-known port tables
//! - [`report`] - Aggregated, port-ordered scan reports
//! - [`config`] - Settings file and data directories
//! - [`storage`] - Scan report persistence
//! - [`output`] - Plain, JSON and CSV rendering
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scanner;
pub mod services;
pub mod storage;
pub mod types;

pub use error::ScanError;
pub use report::ScanReport;
pub use scanner::{run_scan, scan, PortResult, PortState, Scanner};
pub use services::ServiceCatalog;
pub use types::{Port, PortSpec, ScanTarget};
