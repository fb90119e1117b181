//! TCP connect scanner.
//!
//! Completes the full handshake through the operating system's socket API,
//! so no privileges are needed. Each port runs prober, then banner grabbing
//! on open ports, then service identification.

use crate::banner::{self, BannerConfig};
use crate::scanner::probe::{probe, ConnectionOutcome};
use crate::scanner::traits::{PortResult, PortState, Scanner};
use crate::services::ServiceCatalog;
use crate::types::Port;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// TCP connect scanner for a single target.
pub struct TcpConnectScanner {
    target: IpAddr,
    timeout: Duration,
    banner: Option<BannerConfig>,
    catalog: Arc<ServiceCatalog>,
}

impl TcpConnectScanner {
    /// Create a scanner with banner grabbing on and the built-in service tables.
    ///
    /// # Arguments
    /// * `target` - Target IP address to scan
    /// * `timeout` - Connection timeout per port
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self {
            target,
            timeout,
            banner: Some(BannerConfig::default()),
            catalog: Arc::new(ServiceCatalog::default()),
        }
    }

    /// Set banner grabbing parameters, `None` to skip banners entirely.
    pub fn with_banner(mut self, banner: Option<BannerConfig>) -> Self {
        self.banner = banner;
        self
    }

    /// Use a different service catalog.
    pub fn with_catalog(mut self, catalog: Arc<ServiceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }
}

#[async_trait]
impl Scanner for TcpConnectScanner {
    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn scan_port(&self, port: Port) -> PortResult {
        let start = Instant::now();
        let outcome = probe(self.target, port, self.timeout).await;
        let latency = start.elapsed();

        let result = match outcome {
            ConnectionOutcome::Open(stream) => {
                let banner = match &self.banner {
                    Some(config) => banner::extract(stream, port, config).await,
                    None => {
                        drop(stream);
                        None
                    }
                };
                let version = banner.as_deref().and_then(|b| self.catalog.version(b));

                PortResult::new(port, PortState::Open, latency)
                    .with_service(self.catalog.identify(port, banner.as_deref()))
                    .with_version(version)
                    .with_banner(banner)
            }
            ConnectionOutcome::Closed => PortResult::new(port, PortState::Closed, latency)
                .with_service(self.catalog.port_service(port)),
            ConnectionOutcome::Filtered => PortResult::new(port, PortState::Filtered, latency)
                .with_service(self.catalog.port_service(port)),
        };

        debug!(
            %port,
            state = %result.state,
            service = result.service.as_deref().unwrap_or("unknown"),
            latency_ms = latency.as_millis() as u64,
            "port scanned"
        );
        result
    }
}
