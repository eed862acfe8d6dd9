use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use batchget_core::download::output_path_for;
use batchget_core::{
    ClientConfig, DownloadEngine, DownloadStats, HttpClient, Target, read_url_file,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::validation::{self, InputMode};
use crate::app::{exit_handler, progress_manager, terminal};
use crate::cli::Args;
use crate::{ProcessExit, output};

pub(crate) async fn run_batchget(args: Args) -> Result<ProcessExit> {
    let default_level = terminal::resolve_default_log_level(args.verbose, args.quiet);
    terminal::init_tracing(default_level);

    debug!(?args, "CLI arguments parsed");

    let mode = validation::resolve_input_mode(args.url.as_deref(), args.file.as_deref())?;

    let client = HttpClient::with_config(ClientConfig {
        timeout: Duration::from_secs(args.timeout),
    })
    .context("failed to initialize HTTP client")?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping workers");
            signal_token.cancel();
        }
    });

    match mode {
        InputMode::Single { url } => run_single(&args, url, &client, &cancel).await,
        InputMode::Batch { file } => run_batch(&args, &file, &client, &cancel).await,
    }
}

async fn run_single(
    args: &Args,
    url: String,
    client: &HttpClient,
    cancel: &CancellationToken,
) -> Result<ProcessExit> {
    let target = match &args.output {
        Some(path) => Target::new(url).with_output(path.clone()),
        None => Target::new(url),
    };
    info!(target = %target, "downloading single URL");

    let result = tokio::select! {
        result = client.download(&target) => result,
        () = cancel.cancelled() => {
            eprintln!("\n{}", output::INTERRUPTED_MESSAGE);
            return Ok(ProcessExit::Failure);
        }
    };

    if result.success {
        println!("{}", output::single_success_line(&result));
    } else if let Some(failure) = &result.failure {
        eprintln!("Error: failed to download {}: {}", result.url, failure.message);
    }
    Ok(exit_handler::single_exit_outcome(&result))
}

async fn run_batch(
    args: &Args,
    file: &Path,
    client: &HttpClient,
    cancel: &CancellationToken,
) -> Result<ProcessExit> {
    let urls = read_url_file(file)?;
    let total_urls = urls.len();
    println!("{}", output::found_urls_line(total_urls, file));

    if let Some(dir) = &args.output
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        info!(dir = %dir.display(), "created output directory");
    }

    let targets = build_targets(urls, args.output.as_deref());
    let engine = DownloadEngine::new(args.concurrent);

    let stats = Arc::new(DownloadStats::new());
    let use_spinner = !args.json
        && terminal::should_use_spinner(
            io::stderr().is_terminal(),
            args.quiet,
            args.verbose,
            terminal::is_dumb_terminal(),
        );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&stats), total_urls);

    let report = engine
        .process(targets, client, Arc::clone(&stats), cancel, args.sequential)
        .await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    info!(
        mode = %report.mode,
        completed = stats.completed(),
        failed = stats.failed(),
        bytes = stats.bytes(),
        "batch finished"
    );

    output::print_summary(&report, total_urls, args.json)?;

    if report.interrupted {
        eprintln!("\n{}", output::INTERRUPTED_MESSAGE);
    }
    Ok(exit_handler::batch_exit_outcome(&report))
}

/// With `-o` every body goes to `<dir>/<derived name>`; otherwise the client
/// derives a name in the current directory.
fn build_targets(urls: Vec<String>, output_dir: Option<&Path>) -> Vec<Target> {
    urls.into_iter()
        .map(|url| match output_dir {
            Some(dir) => {
                let path = output_path_for(&url, Some(dir));
                Target::new(url).with_output(path)
            }
            None => Target::new(url),
        })
        .collect()
}
