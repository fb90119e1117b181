//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::report::ScanReport;
use crate::scanner::PortState;
use console::{style, Style};
use std::io::{self, Write};

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a report as a table.
pub fn write_plain<W: Write>(
    out: &mut W,
    report: &ScanReport,
    show_closed: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(HEAVY_RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("reconscan").cyan().bold()
    )?;
    writeln!(out, "{}", style(HEAVY_RULE).cyan())?;
    writeln!(out)?;

    let target = report.target();
    writeln!(out, "  {} {}", style("Target:").bold(), target.input)?;
    writeln!(out, "  {} {}", style("IP Address:").bold(), target.ip)?;
    writeln!(
        out,
        "  {} {}",
        style("Started:").bold(),
        report.started_at().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(report.id().short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s{}",
        style("Statistics:").bold(),
        report.len(),
        report.duration().num_milliseconds() as f64 / 1000.0,
        if report.cancelled() {
            format!(
                " ({} of {} before cancellation)",
                report.len(),
                report.ports_requested()
            )
        } else {
            String::new()
        }
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} filtered",
        style(report.count(PortState::Open)).green().bold(),
        style(report.count(PortState::Closed)).red(),
        style(report.count(PortState::Filtered)).yellow()
    )?;
    writeln!(out)?;

    let shown: Vec<_> = report
        .results()
        .filter(|r| show_closed || r.state != PortState::Closed)
        .collect();

    if shown.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(LIGHT_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^10}  {:<18}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("BANNER").bold()
        )?;
        writeln!(out, "  {}", style(LIGHT_RULE).dim())?;

        for result in shown {
            let state_style = match result.state {
                PortState::Open => Style::new().green().bold(),
                PortState::Closed => Style::new().red(),
                PortState::Filtered => Style::new().yellow(),
            };

            let service = match (&result.service, &result.version) {
                (Some(service), Some(version)) => format!("{} {}", service, version),
                (Some(service), None) => service.clone(),
                (None, _) => "unknown".to_string(),
            };

            let banner_display = result
                .banner
                .as_deref()
                .map(|b| truncate_string(b, 35))
                .unwrap_or_default();

            writeln!(
                out,
                "  {:>6}  {:^10}  {:<18}  {}",
                result.port,
                state_style.apply_to(result.state.to_string()),
                truncate_string(&service, 18),
                style(banner_display).dim()
            )?;
        }

        writeln!(out, "  {}", style(LIGHT_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(HEAVY_RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, ip: &str, ports: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("reconscan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({})",
        style("•").dim(),
        style(target).white().bold(),
        ip
    );
    println!(
        "{} Scanning {} ports...",
        style("•").dim(),
        style(ports).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding an ellipsis.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::render;
    use crate::report::ReportBuilder;
    use crate::scanner::PortResult;
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn sample() -> ScanReport {
        let target = ScanTarget::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let mut builder = ReportBuilder::new(target, 2);
        builder.record(
            PortResult::new(Port::new(22).unwrap(), PortState::Open, Duration::from_millis(2))
                .with_banner(Some("SSH-2.0-OpenSSH_9.6".to_string()))
                .with_service(Some("OpenSSH"))
                .with_version(Some("9.6".to_string())),
        );
        builder.record(
            PortResult::new(Port::new(23).unwrap(), PortState::Closed, Duration::from_millis(1))
                .with_service(Some("telnet")),
        );
        builder.finish(false)
    }

    fn rendered(format: OutputFormat, show_closed: bool) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        render(&mut buf, &sample(), format, show_closed).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_plain_hides_closed_by_default() {
        let text = rendered(OutputFormat::Plain, false);
        assert!(text.contains("OpenSSH 9.6"));
        assert!(!text.contains("telnet"));

        let text = rendered(OutputFormat::Plain, true);
        assert!(text.contains("telnet"));
    }

    #[test]
    fn test_csv_rows() {
        let text = rendered(OutputFormat::Csv, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "port,state,service,version,banner,latency_ms");
        assert_eq!(lines[1], "22,open,OpenSSH,9.6,SSH-2.0-OpenSSH_9.6,2");
        assert_eq!(lines[2], "23,closed,telnet,,,1");
    }

    #[test]
    fn test_json_document() {
        let text = rendered(OutputFormat::Json, false);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["target"], "localhost");
        assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
    }
}
