//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use batchget_core::DEFAULT_CONCURRENCY;
use batchget_core::download::constants::TRANSFER_TIMEOUT_SECS;

/// Fetch HTTP resources one at a time or through a worker pool.
///
/// Batchget downloads a single URL or every URL listed in a file and reports
/// per-item and aggregate transfer statistics.
#[derive(Parser, Debug)]
#[command(name = "batchget")]
#[command(author, version, about)]
pub struct Args {
    /// Single URL to download
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// File containing URLs (one per line, # for comments)
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Output file (single URL) or directory (URL file)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Number of concurrent connections (0 or 1 downloads sequentially)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrent: usize,

    /// Download sequentially instead of concurrently
    #[arg(short = 's', long)]
    pub sequential: bool,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Connect and read timeout in seconds (1-600)
    #[arg(long, default_value_t = TRANSFER_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}
