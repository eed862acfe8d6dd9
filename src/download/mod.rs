//! Raw-socket HTTP download engine.
//!
//! This module fetches resources over hand-framed HTTP/1.1, one fresh
//! connection per target, and drives batches either sequentially or through a
//! fixed worker pool.
//!
//! # Features
//!
//! - Plain TCP and TLS (Mozilla root set) transports
//! - 30s connect/read timeout by default
//! - Status line validation, only 200 counts as success
//! - Deterministic output naming, parent directories created on demand
//! - Fill/drain/stop worker protocol with bounded shutdown and cancellation
//!
//! # Example
//!
//! ```no_run
//! use batchget_core::download::HttpClient;
//! use batchget_core::queue::Target;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let result = client
//!     .download(&Target::new("https://example.com/paper.pdf").with_output("./downloads/paper.pdf"))
//!     .await;
//! println!("{} bytes in {:?}", result.bytes, result.elapsed);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod filename;
mod report;
mod response;
mod sequential;
mod transport;

pub use client::{ClientConfig, ClientError, HttpClient};
pub use engine::{DEFAULT_CONCURRENCY, DownloadEngine, EngineConfig};
pub use error::{DownloadError, FailureKind};
pub use filename::{derive_filename, fallback_filename, output_path_for};
pub use report::{
    DownloadStats, RunMode, RunReport, ShutdownAnomaly, TransferFailure, TransferResult,
};
pub use response::RawResponse;
pub use sequential::run_sequential;
pub use transport::{Transport, request_frame};
