//! Scan target resolution.
//!
//! A target is given as a hostname or an IPv4/IPv6 literal and is resolved
//! once, before any scanning starts. A failed lookup aborts the whole scan.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use tracing::{debug, warn};
use trust_dns_resolver::TokioAsyncResolver;

/// A single scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    #[serde(rename = "target")]
    pub input: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(input: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            input: input.into(),
            ip,
        }
    }

    /// Resolve a hostname or IP literal.
    ///
    /// IP literals are accepted as-is. Hostnames go through the system
    /// resolver configuration and the first address returned wins.
    pub async fn resolve(input: &str) -> Result<Self, ResolutionError> {
        let input = input.trim();

        if let Ok(ip) = input.parse::<IpAddr>() {
            return Ok(Self::new(input, ip));
        }
        // Bracketed IPv6, as typed in URLs.
        if let Some(ip) = input
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .and_then(|s| s.parse::<IpAddr>().ok())
        {
            return Ok(Self::new(input, ip));
        }

        if !is_valid_hostname(input) {
            return Err(ResolutionError::InvalidFormat(input.to_string()));
        }

        let ip = lookup(input).await?;
        debug!(host = input, %ip, "resolved target");
        Ok(Self::new(input, ip))
    }

    /// Check if this target is IPv6.
    pub fn is_ipv6(&self) -> bool {
        self.ip.is_ipv6()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.input == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.input, self.ip)
        }
    }
}

/// Error type for target resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("invalid target: '{0}' is neither an IP address nor a hostname")]
    InvalidFormat(String),
    #[error("cannot resolve hostname '{0}': {1}")]
    LookupFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

async fn lookup(host: &str) -> Result<IpAddr, ResolutionError> {
    match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => {
            let response = resolver
                .lookup_ip(host)
                .await
                .map_err(|e| ResolutionError::LookupFailed(host.to_string(), e.to_string()))?;
            response
                .iter()
                .next()
                .ok_or_else(|| ResolutionError::NoAddressesFound(host.to_string()))
        }
        Err(e) => {
            warn!(error = %e, "system resolver configuration unavailable, using getaddrinfo");
            let mut addrs = tokio::net::lookup_host((host, 0))
                .await
                .map_err(|e| ResolutionError::LookupFailed(host.to_string(), e.to_string()))?;
            addrs
                .next()
                .map(|addr| addr.ip())
                .ok_or_else(|| ResolutionError::NoAddressesFound(host.to_string()))
        }
    }
}

/// Check if a string is a syntactically valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}
