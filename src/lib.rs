//! Batchget Core Library
//!
//! This library provides the download engine behind the `batchget` tool:
//! it fetches lists of HTTP/HTTPS resources over raw sockets, either one at a
//! time or through a fixed worker pool, and reports per-item and aggregate
//! transfer statistics.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - URL resolution and URL list input
//! - [`download`] - transport, response parsing, single transfers and batch runners
//! - [`queue`] - task queue and completion counter shared by workers

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod parser;
pub mod queue;

// Re-export commonly used types
pub use download::{
    ClientConfig, DEFAULT_CONCURRENCY, DownloadEngine, DownloadError, DownloadStats,
    EngineConfig, FailureKind, HttpClient, RunMode, RunReport, TransferResult,
    run_sequential,
};
pub use parser::{ParsedUrl, Scheme, parse_url_list, read_url_file, resolve_url};
pub use queue::{Target, Task, TaskQueue};
