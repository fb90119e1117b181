//! Core value types: validated ports, port specifications, resolved targets
//! and scan identifiers.

mod port;
mod scan_id;
mod target;

pub use port::{Port, PortRange, PortSpec, PortSpecError, DEFAULT_PORTS};
pub use scan_id::ScanId;
pub use target::{ResolutionError, ScanTarget};
