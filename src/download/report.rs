//! Result records shared by the sequential runner and the work distributor.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::error::{DownloadError, FailureKind};

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Why a transfer failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable reason
    pub message: String,
}

impl From<&DownloadError> for TransferFailure {
    fn from(error: &DownloadError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one target. Exactly one is produced per target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    /// The target URL
    pub url: String,
    /// Whether the body was fetched with status 200 and written
    pub success: bool,
    /// Time from resolution start to write completion; zero on failure
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Body size written; zero on failure
    pub bytes: u64,
    /// Where the body was written, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Why the transfer failed, on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TransferFailure>,
}

impl TransferResult {
    /// Creates a successful result.
    #[must_use]
    pub fn succeeded(url: impl Into<String>, elapsed: Duration, bytes: u64, path: PathBuf) -> Self {
        Self {
            url: url.into(),
            success: true,
            elapsed,
            bytes,
            path: Some(path),
            failure: None,
        }
    }

    /// Creates a failed result with zero elapsed time and zero bytes.
    #[must_use]
    pub fn failed(url: impl Into<String>, error: &DownloadError) -> Self {
        Self {
            url: url.into(),
            success: false,
            elapsed: Duration::ZERO,
            bytes: 0,
            path: None,
            failure: Some(TransferFailure::from(error)),
        }
    }
}

/// Live counters for an in-progress run.
///
/// Uses atomic counters for thread-safe updates from concurrent workers.
/// Progress displays read these while the run is still going.
#[derive(Debug, Default)]
pub struct DownloadStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    bytes: AtomicU64,
    workers_started: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful transfers so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed transfers so far.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of finished transfers (completed + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Returns bytes written by successful transfers so far.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    /// Returns how many pool workers have actually started running.
    #[must_use]
    pub fn workers_started(&self) -> usize {
        self.workers_started.load(Ordering::SeqCst)
    }

    pub(crate) fn record_worker_start(&self) {
        self.workers_started.fetch_add(1, Ordering::SeqCst);
    }

    /// Records one finished transfer.
    pub(crate) fn record(&self, result: &TransferResult) {
        if result.success {
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(result.bytes, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A worker that did not stop within the shutdown wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownAnomaly {
    /// Index of the worker in the pool
    pub worker_id: usize,
    /// How long the distributor waited before giving up
    #[serde(rename = "waited_secs", serialize_with = "as_secs_f64")]
    pub waited: Duration,
}

/// Execution strategy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunMode {
    /// One target at a time
    Sequential,
    /// Worker pool with the requested connection count
    Concurrent {
        /// Requested concurrency
        connections: usize,
    },
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Concurrent { connections } => write!(f, "Concurrent ({connections} connections)"),
        }
    }
}

/// Everything a finished (or interrupted) run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// How the run was executed
    #[serde(flatten)]
    pub mode: RunMode,
    /// One entry per processed target, in completion order
    pub results: Vec<TransferResult>,
    /// Wall-clock duration of the whole run
    #[serde(rename = "total_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Number of workers started (1 for sequential runs with targets)
    pub workers: usize,
    /// Workers that failed to stop in time
    pub shutdown_anomalies: Vec<ShutdownAnomaly>,
    /// Whether the run was cancelled before every target was processed
    pub interrupted: bool,
}

impl RunReport {
    /// Report for a run with no targets.
    #[must_use]
    pub fn empty(mode: RunMode) -> Self {
        Self {
            mode,
            results: Vec::new(),
            elapsed: Duration::ZERO,
            workers: 0,
            shutdown_anomalies: Vec::new(),
            interrupted: false,
        }
    }

    /// Number of successful transfers.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Number of failed transfers.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.len() - self.successes()
    }

    /// Total bytes of successful transfers.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.results.iter().filter(|r| r.success).map(|r| r.bytes).sum()
    }

    /// Average throughput in KiB/s, or `None` when nothing succeeded or the
    /// run took no measurable time.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_kib_per_sec(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.successes() == 0 || secs <= 0.0 {
            return None;
        }
        Some(self.total_bytes() as f64 / secs / 1024.0)
    }

    /// Iterates over failed results.
    pub fn failed_results(&self) -> impl Iterator<Item = &TransferResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn ok(bytes: u64) -> TransferResult {
        TransferResult::succeeded(
            "http://host/a.html",
            Duration::from_millis(10),
            bytes,
            PathBuf::from("a.html"),
        )
    }

    fn not_found() -> TransferResult {
        TransferResult::failed(
            "http://host/missing",
            &DownloadError::http_status("http://host/missing", 404),
        )
    }

    #[test]
    fn test_failed_result_has_zero_elapsed_and_bytes() {
        let result = not_found();
        assert!(!result.success);
        assert_eq!(result.elapsed, Duration::ZERO);
        assert_eq!(result.bytes, 0);
        assert_eq!(result.failure.as_ref().unwrap().kind, FailureKind::Status);
    }

    #[test]
    fn test_report_summary_counts() {
        let report = RunReport {
            results: vec![ok(120), not_found()],
            elapsed: Duration::from_secs(1),
            workers: 2,
            ..RunReport::empty(RunMode::Concurrent { connections: 10 })
        };
        assert_eq!(report.successes(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.total_bytes(), 120);
        assert_eq!(report.failed_results().count(), 1);
        let speed = report.average_kib_per_sec().unwrap();
        assert!((speed - 120.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_speed_unavailable_without_time_or_success() {
        let report = RunReport {
            results: vec![ok(10)],
            ..RunReport::empty(RunMode::Sequential)
        };
        assert!(report.average_kib_per_sec().is_none());

        let report = RunReport {
            results: vec![not_found()],
            elapsed: Duration::from_secs(1),
            ..RunReport::empty(RunMode::Sequential)
        };
        assert!(report.average_kib_per_sec().is_none());
    }

    #[test]
    fn test_run_mode_display() {
        assert_eq!(RunMode::Sequential.to_string(), "Sequential");
        assert_eq!(
            RunMode::Concurrent { connections: 4 }.to_string(),
            "Concurrent (4 connections)"
        );
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = RunReport {
            results: vec![ok(5), not_found()],
            elapsed: Duration::from_millis(1500),
            workers: 2,
            ..RunReport::empty(RunMode::Concurrent { connections: 2 })
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "concurrent");
        assert_eq!(json["connections"], 2);
        assert_eq!(json["total_secs"], 1.5);
        assert_eq!(json["results"][1]["failure"]["kind"], "status");
        assert!(json["results"][0].get("failure").is_none());
    }

    #[test]
    fn test_download_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(DownloadStats::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.record(&ok(2));
                    stats.record(&not_found());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.completed(), 1000);
        assert_eq!(stats.failed(), 1000);
        assert_eq!(stats.total(), 2000);
        assert_eq!(stats.bytes(), 2000);
    }
}
