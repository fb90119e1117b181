//! Scanner trait abstraction and per-port result types.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Handshake completed.
    Open,
    /// Connection actively refused.
    Closed,
    /// No answer before the timeout. A dropped packet and a slow host look the same.
    Filtered,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of scanning a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// The port number that was scanned.
    pub port: Port,
    /// State determined by the connect attempt.
    pub state: PortState,
    /// Banner captured from the service (if any).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Detected or conventional service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Product version taken from the banner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Time spent on the connect attempt.
    #[serde(rename = "latency_ms", with = "duration_ms")]
    pub latency: Duration,
}

impl PortResult {
    /// Create a new port result.
    pub fn new(port: Port, state: PortState, latency: Duration) -> Self {
        Self {
            port,
            state,
            banner: None,
            service: None,
            version: None,
            latency,
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Set the service label.
    pub fn with_service(mut self, service: Option<impl Into<String>>) -> Self {
        self.service = service.map(Into::into);
        self
    }

    /// Set the product version.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Trait for the per-port unit of work the orchestrator fans out.
///
/// Implementations must absorb every network condition into the returned
/// [`PortResult`]; `scan_port` has no error path.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan a single port.
    async fn scan_port(&self, port: Port) -> PortResult;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;

    /// Get the configured connect timeout.
    fn timeout(&self) -> Duration;
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
