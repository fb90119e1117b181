//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::{write_json, write_json_file};
pub use plain::{
    print_error, print_info, print_scan_header, print_success, print_warning, write_plain,
};

use crate::cli::OutputFormat;
use crate::report::ScanReport;
use std::io::{self, Write};

/// Format and print a report to stdout.
///
/// Closed ports are listed only in plain output with `show_closed`; the JSON
/// and CSV forms always carry every result.
pub fn print_results(
    report: &ScanReport,
    format: OutputFormat,
    show_closed: bool,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, report, format, show_closed)?;
    out.flush()
}

/// Format a report into any writer.
pub fn render<W: Write>(
    out: &mut W,
    report: &ScanReport,
    format: OutputFormat,
    show_closed: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report, show_closed),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}
