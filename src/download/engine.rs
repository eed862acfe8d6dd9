//! Work distributor: a fixed worker pool fed from one shared task queue.
//!
//! A run moves through four phases:
//!
//! 1. **Filling** - every target is queued before any worker starts.
//! 2. **Draining** - `min(concurrency, targets)` workers pop targets, download
//!    them and append results to the run's shared collection.
//! 3. **Stopping** - once the completion counter reaches zero (not merely once
//!    the queue looks empty), one stop sentinel per worker is queued.
//! 4. **Done** - workers are joined against one shared deadline; stragglers
//!    are reported as [`ShutdownAnomaly`]s and left to finish detached.
//!
//! Cancelling the token skips straight to stopping: sentinels go to the front
//! of the queue, in-flight transfers finish or time out on their own, and
//! targets never dequeued get no result.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use batchget_core::download::{DownloadEngine, DownloadStats, HttpClient};
//! use batchget_core::queue::Target;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(10);
//! let client = HttpClient::new()?;
//! let targets = vec![Target::new("https://example.com/a.html")];
//! let report = engine
//!     .run(targets, &client, Arc::new(DownloadStats::new()), &CancellationToken::new())
//!     .await;
//! println!("ok: {}, failed: {}", report.successes(), report.failures());
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::constants::SHUTDOWN_WAIT;
use super::report::{DownloadStats, RunMode, RunReport, ShutdownAnomaly, TransferResult};
use super::sequential::run_sequential;
use crate::queue::{CompletionCounter, Target, Task, TaskQueue};

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Settings for [`DownloadEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Requested worker count; 0 or 1 means a sequential run
    pub concurrency: usize,
    /// Bounded wait for workers to stop once sentinels are queued
    pub shutdown_wait: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            shutdown_wait: SHUTDOWN_WAIT,
        }
    }
}

type SharedResults = Arc<Mutex<Vec<TransferResult>>>;

/// Concurrent batch downloader with a fixed worker pool.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    concurrency: usize,
    shutdown_wait: Duration,
}

impl DownloadEngine {
    /// Creates an engine with the given concurrency and default shutdown wait.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self::with_config(EngineConfig {
            concurrency,
            ..EngineConfig::default()
        })
    }

    /// Creates an engine from explicit settings.
    #[must_use]
    #[instrument(level = "debug")]
    pub fn with_config(config: EngineConfig) -> Self {
        debug!(
            concurrency = config.concurrency,
            shutdown_wait_ms = config.shutdown_wait.as_millis(),
            "creating download engine"
        );

        Self {
            concurrency: config.concurrency,
            shutdown_wait: config.shutdown_wait,
        }
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns how many workers a run over `targets` targets starts.
    ///
    /// A pool run always has at least one worker when there is work.
    #[must_use]
    pub fn worker_count(&self, targets: usize) -> usize {
        self.concurrency.max(1).min(targets)
    }

    /// Runs the batch sequentially when asked to, or when concurrency is 0
    /// or 1, and through the worker pool otherwise.
    pub async fn process(
        &self,
        targets: Vec<Target>,
        client: &HttpClient,
        stats: Arc<DownloadStats>,
        cancel: &CancellationToken,
        sequential: bool,
    ) -> RunReport {
        if sequential || self.concurrency <= 1 {
            run_sequential(targets, client, &stats, cancel).await
        } else {
            self.run(targets, client, stats, cancel).await
        }
    }

    /// Downloads every target through the worker pool.
    ///
    /// Produces exactly one [`TransferResult`] per target unless `cancel`
    /// fires first. Individual download failures never abort the run.
    #[instrument(skip_all, fields(targets = targets.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        targets: Vec<Target>,
        client: &HttpClient,
        stats: Arc<DownloadStats>,
        cancel: &CancellationToken,
    ) -> RunReport {
        let mode = RunMode::Concurrent {
            connections: self.concurrency,
        };
        if targets.is_empty() {
            info!("no targets, nothing to do");
            return RunReport::empty(mode);
        }

        let started = Instant::now();
        let total = targets.len();
        let workers = self.worker_count(total);
        info!(total, workers, "starting concurrent download");

        // Filling
        let queue = Arc::new(TaskQueue::new());
        queue.extend(targets.into_iter().map(Task::Fetch));
        let completion = Arc::new(CompletionCounter::new(total));
        let results: SharedResults = Arc::new(Mutex::new(Vec::with_capacity(total)));

        // Draining
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&queue),
                    client.clone(),
                    Arc::clone(&results),
                    Arc::clone(&completion),
                    Arc::clone(&stats),
                    cancel.clone(),
                ))
            })
            .collect();
        debug!(workers, "waiting for workers to drain the queue");

        // Stopping
        let interrupted = tokio::select! {
            () = completion.wait() => false,
            () = cancel.cancelled() => true,
        };
        if interrupted {
            warn!(
                remaining = completion.remaining(),
                "run cancelled, stopping workers"
            );
            for _ in 0..workers {
                queue.push_front(Task::Stop);
            }
        } else {
            info!("all downloads complete, signaling workers to stop");
            for _ in 0..workers {
                queue.push(Task::Stop);
            }
        }

        // Done
        let shutdown_anomalies = self.join_workers(handles).await;

        let results = std::mem::take(&mut *results.lock().unwrap_or_else(PoisonError::into_inner));
        let report = RunReport {
            mode,
            elapsed: started.elapsed(),
            workers,
            shutdown_anomalies,
            interrupted,
            results,
        };
        info!(
            completed = report.successes(),
            failed = report.failures(),
            bytes = report.total_bytes(),
            elapsed_ms = report.elapsed.as_millis(),
            "concurrent download finished"
        );
        report
    }

    /// Joins workers against one deadline.
    ///
    /// A worker that overruns it is reported and detached: its in-flight
    /// transfer keeps running until it completes or times out.
    async fn join_workers(
        &self,
        handles: Vec<tokio::task::JoinHandle<()>>,
    ) -> Vec<ShutdownAnomaly> {
        let deadline = time::Instant::now() + self.shutdown_wait;
        let mut anomalies = Vec::new();

        for (worker_id, handle) in handles.into_iter().enumerate() {
            match time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(worker_id, error = %e, "worker task panicked"),
                Err(_) => {
                    // Dropping the handle detaches the task
                    warn!(
                        worker_id,
                        waited_ms = self.shutdown_wait.as_millis(),
                        "worker did not terminate cleanly, detaching"
                    );
                    anomalies.push(ShutdownAnomaly {
                        worker_id,
                        waited: self.shutdown_wait,
                    });
                }
            }
        }

        anomalies
    }
}

/// Marks a target processed even if the transfer future unwinds.
struct CompleteOnDrop<'a>(&'a CompletionCounter);

impl Drop for CompleteOnDrop<'_> {
    fn drop(&mut self) {
        self.0.complete_one();
    }
}

#[instrument(skip_all, fields(worker_id = worker_id))]
async fn worker_loop(
    worker_id: usize,
    queue: Arc<TaskQueue>,
    client: HttpClient,
    results: SharedResults,
    completion: Arc<CompletionCounter>,
    stats: Arc<DownloadStats>,
    cancel: CancellationToken,
) {
    stats.record_worker_start();
    debug!("worker started");

    loop {
        if cancel.is_cancelled() {
            debug!("cancellation observed");
            break;
        }
        let Some(task) = queue.pop(&cancel).await else {
            debug!("cancelled while idle");
            break;
        };

        let target = match task {
            Task::Stop => {
                debug!("received stop signal");
                break;
            }
            Task::Fetch(target) => target,
        };

        let _done = CompleteOnDrop(&completion);
        debug!(url = %target.url, "processing");

        let result = client.download(&target).await;
        stats.record(&result);
        debug!(
            url = %result.url,
            success = result.success,
            bytes = result.bytes,
            elapsed_ms = result.elapsed.as_millis(),
            "finished"
        );
        results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    debug!("worker terminated");
}
