//! JSON output formatting.

use crate::report::ScanReport;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write a report as pretty JSON followed by a newline.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// Write a report to a JSON file, replacing it if it exists.
pub fn write_json_file(path: &Path, report: &ScanReport) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_json(&mut out, report)?;
    out.flush()
}
