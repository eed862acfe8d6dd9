//! Sequential runner: one target at a time, in input order.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::report::{DownloadStats, RunMode, RunReport};
use crate::queue::Target;

/// Downloads each target in order on the current task.
///
/// The cancellation token is checked between targets; a transfer already in
/// flight runs to completion or timeout.
#[instrument(skip_all, fields(targets = targets.len()))]
pub async fn run_sequential(
    targets: Vec<Target>,
    client: &HttpClient,
    stats: &DownloadStats,
    cancel: &CancellationToken,
) -> RunReport {
    if targets.is_empty() {
        info!("no targets, nothing to do");
        return RunReport::empty(RunMode::Sequential);
    }

    let total = targets.len();
    info!(total, "starting sequential download");

    let started = Instant::now();
    let mut results = Vec::with_capacity(total);
    let mut interrupted = false;

    for (index, target) in targets.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(remaining = total - index, "run cancelled");
            interrupted = true;
            break;
        }
        debug!(position = index + 1, total, url = %target.url, "downloading");

        let result = client.download(target).await;
        stats.record(&result);
        results.push(result);
    }

    let report = RunReport {
        mode: RunMode::Sequential,
        results,
        elapsed: started.elapsed(),
        workers: 1,
        shutdown_anomalies: Vec::new(),
        interrupted,
    };
    info!(
        completed = report.successes(),
        failed = report.failures(),
        bytes = report.total_bytes(),
        elapsed_ms = report.elapsed.as_millis(),
        "sequential download finished"
    );
    report
}
