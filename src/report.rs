//! The aggregated scan report.
//!
//! A [`ReportBuilder`] collects port results as they arrive, in any order.
//! [`ReportBuilder::finish`] consumes it and produces the immutable
//! [`ScanReport`] handed to printers, the JSON writer and the history store.

use crate::scanner::{PortResult, PortState};
use crate::types::{Port, ScanId, ScanTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::warn;

/// Final result of one scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    id: ScanId,
    #[serde(flatten)]
    target: ScanTarget,
    #[serde(rename = "timestamp")]
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    ports_requested: usize,
    #[serde(default)]
    cancelled: bool,
    #[serde(serialize_with = "results_as_seq", deserialize_with = "results_from_seq")]
    results: BTreeMap<Port, PortResult>,
}

impl ScanReport {
    pub fn id(&self) -> ScanId {
        self.id
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Wall-clock duration of the scan.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Number of ports in the specification the scan was started with.
    pub fn ports_requested(&self) -> usize {
        self.ports_requested
    }

    /// True when cancellation stopped the scan before every port was submitted.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Results ordered by port number.
    pub fn results(&self) -> impl Iterator<Item = &PortResult> {
        self.results.values()
    }

    pub fn get(&self, port: Port) -> Option<&PortResult> {
        self.results.get(&port)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Open ports, in order.
    pub fn open_ports(&self) -> impl Iterator<Item = &PortResult> {
        self.results().filter(|r| r.is_open())
    }

    /// Count results in a given state.
    pub fn count(&self, state: PortState) -> usize {
        self.results().filter(|r| r.state == state).count()
    }

    /// One-line summary used by the history listing.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} open, {} closed, {} filtered [{:.2}s]{}",
            self.target,
            self.count(PortState::Open),
            self.count(PortState::Closed),
            self.count(PortState::Filtered),
            self.duration().num_milliseconds() as f64 / 1000.0,
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

/// Mutable accumulator for a scan in progress.
#[derive(Debug)]
pub struct ReportBuilder {
    target: ScanTarget,
    started_at: DateTime<Utc>,
    ports_requested: usize,
    results: BTreeMap<Port, PortResult>,
}

impl ReportBuilder {
    /// Start a report; the start timestamp is taken now.
    pub fn new(target: ScanTarget, ports_requested: usize) -> Self {
        Self {
            target,
            started_at: Utc::now(),
            ports_requested,
            results: BTreeMap::new(),
        }
    }

    /// Insert a result. Each port is recorded once; a second result for the
    /// same port is ignored.
    pub fn record(&mut self, result: PortResult) {
        match self.results.entry(result.port) {
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
            Entry::Occupied(_) => warn!(port = %result.port, "duplicate result for port"),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Freeze the report. The finish timestamp is taken now.
    pub fn finish(self, cancelled: bool) -> ScanReport {
        ScanReport {
            id: ScanId::new(),
            target: self.target,
            started_at: self.started_at,
            finished_at: Utc::now(),
            ports_requested: self.ports_requested,
            cancelled,
            results: self.results,
        }
    }
}

fn results_as_seq<S: Serializer>(
    results: &BTreeMap<Port, PortResult>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(results.values())
}

fn results_from_seq<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Port, PortResult>, D::Error> {
    let results = Vec::<PortResult>::deserialize(deserializer)?;
    Ok(results.into_iter().map(|r| (r.port, r)).collect())
}
