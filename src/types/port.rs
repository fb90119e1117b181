//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is a single token of a specification and `PortSpec` is the
//! expanded, deduplicated set of ports a scan will touch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ports scanned when the specification is empty.
pub const DEFAULT_PORTS: &[u16] = &[
    7, 9, 13, 20, 21, 22, 23, 25, 26, 37, 53, 79, 80, 81, 88, 106, 110, 111, 113, 119, 135, 139,
    143, 144, 179, 199, 389, 427, 443, 444, 445, 465, 513, 514, 515, 543, 544, 548, 554, 587, 631,
    646, 873, 990, 993, 995, 1025, 1026, 1027, 1028, 1029, 1110, 1433, 1720, 1723, 1755, 1900,
    2000, 2001, 2049, 2121, 2717, 3000, 3128, 3306, 3389, 3986, 4899, 5000, 5009, 5051, 5060,
    5101, 5190, 5357, 5432, 5631, 5666, 5800, 5900, 6000, 6001, 6379, 6646, 7070, 8000, 8008,
    8009, 8080, 8081, 8443, 8888, 9100, 9999, 10000, 27017, 32768, 49152, 49153, 49154, 49155,
    49156, 49157,
];

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None for port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Parse a single decimal token, reporting out-of-range values as such.
    fn parse_token(token: &str) -> Result<Self, PortSpecError> {
        let token = token.trim();
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PortSpecError::InvalidFormat(token.to_string()));
        }

        // Anything too long for a u32 is certainly out of range.
        let value: u32 = token
            .parse()
            .map_err(|_| PortSpecError::OutOfRange(token.to_string()))?;

        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| PortSpecError::OutOfRange(value.to_string()))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortSpecError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PortSpecError::OutOfRange(value.to_string()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port specification parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortSpecError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(String),
    #[error("invalid port token: '{0}'")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
}

/// An inclusive range of ports, one token of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortSpecError> {
        if start > end {
            Err(PortSpecError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl FromStr for PortRange {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token.split_once('-') {
            Some((low, high)) => {
                let start = Port::parse_token(low)?;
                let end = Port::parse_token(high)?;
                Self::new(start, end)
            }
            None => Port::parse_token(token).map(Self::single),
        }
    }
}

/// The ordered, duplicate-free set of ports to scan.
///
/// Supports formats like:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1000"
/// - Mixed: "22,80,443,8000-9000"
///
/// An empty specification selects [`DEFAULT_PORTS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// Parse a specification string.
    pub fn parse(spec: &str) -> Result<Self, PortSpecError> {
        if spec.trim().is_empty() {
            return Ok(Self::common());
        }

        let mut ports = Vec::new();
        for token in spec.split(',') {
            let range: PortRange = token.parse()?;
            ports.extend(range.iter());
        }

        Ok(Self::from_ports(ports))
    }

    /// The built-in common ports set.
    pub fn common() -> Self {
        Self::from_ports(DEFAULT_PORTS.iter().copied().filter_map(Port::new))
    }

    /// Full port range (1-65535).
    pub fn full() -> Self {
        Self::from_ports((Port::MIN..=Port::MAX).map(Port))
    }

    fn from_ports(ports: impl IntoIterator<Item = Port>) -> Self {
        let mut ports: Vec<Port> = ports.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();
        Self { ports }
    }

    /// Ports in ascending order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Number of distinct ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn contains(&self, port: Port) -> bool {
        self.ports.binary_search(&port).is_ok()
    }
}

impl FromStr for PortSpec {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortSpec {
    /// Compact form, consecutive ports folded back into ranges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let mut iter = self.ports.iter().map(|p| p.0).peekable();

        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&end.wrapping_add(1)) && end < Port::MAX {
                end += 1;
                iter.next();
            }
            parts.push(if start == end {
                start.to_string()
            } else {
                format!("{}-{}", start, end)
            });
        }

        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(spec: &PortSpec) -> Vec<u16> {
        spec.ports().iter().map(|p| p.as_u16()).collect()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_port_range() {
        let range: PortRange = "1-100".parse().unwrap();
        assert_eq!(range.len(), 100);
        assert_eq!(range.iter().next(), Port::new(1));
    }

    #[test]
    fn test_port_spec_parsing() {
        assert_eq!(raw(&"80".parse().unwrap()), vec![80]);
        assert_eq!(raw(&"443, 80".parse().unwrap()), vec![80, 443]);
        assert_eq!(PortSpec::parse("1-100").unwrap().len(), 100);
        assert_eq!(PortSpec::parse("22,80,443,8000-8010").unwrap().len(), 14);
    }

    #[test]
    fn test_mixed_spec() {
        let spec = PortSpec::parse("20-22,80").unwrap();
        assert_eq!(raw(&spec), vec![20, 21, 22, 80]);
    }

    #[test]
    fn test_port_spec_dedup() {
        let spec = PortSpec::parse("80,80,443,80,79-81").unwrap();
        assert_eq!(raw(&spec), vec![79, 80, 81, 443]);
    }

    #[test]
    fn test_whitespace_around_tokens() {
        let spec = PortSpec::parse("  22 , 8000 - 8002 ").unwrap();
        assert_eq!(raw(&spec), vec![22, 8000, 8001, 8002]);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            PortSpec::parse("70000"),
            Err(PortSpecError::OutOfRange("70000".to_string()))
        );
        assert!(matches!(PortSpec::parse("0"), Err(PortSpecError::OutOfRange(_))));
        assert!(matches!(
            PortSpec::parse("1-99999999999"),
            Err(PortSpecError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        for spec in ["abc", "80,,443", "1-2-3", "-5", "80-", "8o", "+80"] {
            assert!(
                matches!(PortSpec::parse(spec), Err(PortSpecError::InvalidFormat(_))),
                "{spec} should be rejected"
            );
        }
    }

    #[test]
    fn test_inverted_range() {
        assert_eq!(
            PortSpec::parse("100-50"),
            Err(PortSpecError::InvalidRange(100, 50))
        );
    }

    #[test]
    fn test_empty_spec_uses_defaults() {
        let spec = PortSpec::parse("   ").unwrap();
        assert_eq!(spec, PortSpec::common());
        assert!(spec.contains(Port::new(22).unwrap()));
        assert!(spec.ports().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_full_range() {
        let spec = PortSpec::full();
        assert_eq!(spec.len(), 65535);
        assert_eq!(spec.to_string(), "1-65535");
    }

    #[test]
    fn test_display_folds_ranges() {
        let spec = PortSpec::parse("80,20-22,443,444").unwrap();
        assert_eq!(spec.to_string(), "20-22,80,443-444");
    }

    #[test]
    fn test_parse_invariants_hold() {
        for input in ["1", "65535", "1-10,5-15", "9,8,7,6", "1000-1100,1050"] {
            let spec = PortSpec::parse(input).unwrap();
            let ports = raw(&spec);
            assert!(ports.windows(2).all(|w| w[0] < w[1]), "{input}");
            assert!(ports.iter().all(|&p| p >= 1));
        }
    }
}
