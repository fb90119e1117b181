//! CSV output formatting.

use crate::report::ScanReport;
use std::io::{self, Write};

/// Write one CSV row per result.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "state", "service", "version", "banner", "latency_ms"])?;

    for result in report.results() {
        let port = result.port.to_string();
        let state = result.state.to_string();
        let latency = result.latency.as_millis().to_string();
        let row: [&str; 6] = [
            &port,
            &state,
            result.service.as_deref().unwrap_or(""),
            result.version.as_deref().unwrap_or(""),
            result.banner.as_deref().unwrap_or(""),
            &latency,
        ];
        wtr.write_record(row)?;
    }

    wtr.flush()
}
