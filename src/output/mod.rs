//! CLI output formatting and display helpers.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use batchget_core::{RunReport, TransferResult};
use serde::Serialize;

/// Printed when a run is cut short with Ctrl-C.
pub(crate) const INTERRUPTED_MESSAGE: &str = "Interrupted by user!";

/// Line printed after a successful single-URL download.
pub(crate) fn single_success_line(result: &TransferResult) -> String {
    format!(
        "Downloaded {} bytes in {:.2} seconds",
        result.bytes,
        result.elapsed.as_secs_f64()
    )
}

/// Line printed once the URL file has been read.
pub(crate) fn found_urls_line(count: usize, file: &Path) -> String {
    format!("Found {count} URLs in {}", file.display())
}

/// Returns the human-readable summary block for a batch run.
///
/// `total_urls` is the number of URLs read from the file; an interrupted run
/// may hold fewer results than that, the rest count as failed.
pub(crate) fn summary_lines(report: &RunReport, total_urls: usize) -> Vec<String> {
    let successful = report.successes();
    let total_size = report.total_bytes();

    let mut lines = vec![
        String::new(),
        format!("{} Download Summary:", report.mode),
        format!("  Total URLs: {total_urls}"),
        format!("  Successful: {successful}"),
        format!("  Failed: {}", total_urls.saturating_sub(successful)),
        format!("  Total time: {}", format_secs(report.elapsed)),
        format!("  Total size: {total_size} bytes"),
    ];
    if successful > 0 {
        match report.average_kib_per_sec() {
            Some(speed) => lines.push(format!("  Average speed: {speed:.2} KB/s")),
            None => lines.push("  Average speed: N/A (time was near zero)".to_string()),
        }
    }

    let failed: Vec<&TransferResult> = report.failed_results().collect();
    if !failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed URLs:".to_string());
        for result in failed {
            let reason = result
                .failure
                .as_ref()
                .map_or("unknown error", |f| f.message.as_str());
            lines.push(format!("  {} - {reason}", result.url));
        }
    }

    if !report.shutdown_anomalies.is_empty() {
        lines.push(String::new());
        for anomaly in &report.shutdown_anomalies {
            lines.push(format!(
                "Warning: worker {} did not stop within {}",
                anomaly.worker_id,
                format_secs(anomaly.waited)
            ));
        }
    }

    lines
}

fn format_secs(duration: Duration) -> String {
    format!("{:.2} seconds", duration.as_secs_f64())
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    total_urls: usize,
    successful: usize,
    failed: usize,
    total_bytes: u64,
    average_kib_per_sec: Option<f64>,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Renders the batch summary as pretty-printed JSON.
pub(crate) fn summary_json(report: &RunReport, total_urls: usize) -> Result<String> {
    let successful = report.successes();
    let summary = JsonSummary {
        total_urls,
        successful,
        failed: total_urls.saturating_sub(successful),
        total_bytes: report.total_bytes(),
        average_kib_per_sec: report.average_kib_per_sec(),
        report,
    };
    serde_json::to_string_pretty(&summary).context("failed to serialize run summary")
}

/// Prints the batch summary to stdout, as text or JSON.
pub(crate) fn print_summary(report: &RunReport, total_urls: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", summary_json(report, total_urls)?);
    } else {
        for line in summary_lines(report, total_urls) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use batchget_core::{DownloadError, RunMode};

    use super::*;

    fn report(mode: RunMode, results: Vec<TransferResult>, elapsed: Duration) -> RunReport {
        RunReport {
            mode,
            results,
            elapsed,
            workers: 2,
            shutdown_anomalies: Vec::new(),
            interrupted: false,
        }
    }

    fn mixed_results() -> Vec<TransferResult> {
        vec![
            TransferResult::succeeded(
                "http://host/a.html",
                Duration::from_millis(100),
                120,
                PathBuf::from("a.html"),
            ),
            TransferResult::failed(
                "http://host/missing",
                &DownloadError::http_status("http://host/missing", 404),
            ),
        ]
    }

    #[test]
    fn test_single_success_line_formats_two_decimals() {
        let result = TransferResult::succeeded(
            "http://host/a",
            Duration::from_millis(1500),
            42,
            PathBuf::from("a"),
        );
        assert_eq!(
            single_success_line(&result),
            "Downloaded 42 bytes in 1.50 seconds"
        );
    }

    #[test]
    fn test_found_urls_line() {
        assert_eq!(
            found_urls_line(3, Path::new("urls.txt")),
            "Found 3 URLs in urls.txt"
        );
    }

    #[test]
    fn test_summary_lines_mixed_outcome() {
        let report = report(
            RunMode::Concurrent { connections: 10 },
            mixed_results(),
            Duration::from_secs(2),
        );
        let lines = summary_lines(&report, 2);

        assert!(lines.contains(&"Concurrent (10 connections) Download Summary:".to_string()));
        assert!(lines.contains(&"  Total URLs: 2".to_string()));
        assert!(lines.contains(&"  Successful: 1".to_string()));
        assert!(lines.contains(&"  Failed: 1".to_string()));
        assert!(lines.contains(&"  Total time: 2.00 seconds".to_string()));
        assert!(lines.contains(&"  Total size: 120 bytes".to_string()));
        assert!(lines.contains(&"  Average speed: 0.06 KB/s".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("  http://host/missing - ") && l.contains("404"))
        );
    }

    #[test]
    fn test_summary_lines_zero_elapsed_reports_na() {
        let report = report(RunMode::Sequential, mixed_results(), Duration::ZERO);
        let lines = summary_lines(&report, 2);
        assert!(lines.contains(&"Sequential Download Summary:".to_string()));
        assert!(lines.contains(&"  Average speed: N/A (time was near zero)".to_string()));
    }

    #[test]
    fn test_summary_lines_no_success_omits_speed() {
        let results = vec![TransferResult::failed(
            "http://host/x",
            &DownloadError::http_status("http://host/x", 500),
        )];
        let report = report(RunMode::Sequential, results, Duration::from_secs(1));
        let lines = summary_lines(&report, 1);
        assert!(!lines.iter().any(|l| l.contains("Average speed")));
    }

    #[test]
    fn test_summary_lines_counts_unprocessed_urls_as_failed() {
        let mut report = report(RunMode::Sequential, mixed_results(), Duration::from_secs(1));
        report.interrupted = true;
        let lines = summary_lines(&report, 5);
        assert!(lines.contains(&"  Failed: 4".to_string()));
    }

    #[test]
    fn test_summary_json_contains_totals_and_results() {
        let report = report(
            RunMode::Concurrent { connections: 4 },
            mixed_results(),
            Duration::from_secs(1),
        );
        let json = summary_json(&report, 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_urls"], 2);
        assert_eq!(value["successful"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["total_bytes"], 120);
        assert_eq!(value["mode"], "concurrent");
        assert_eq!(value["connections"], 4);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }
}
