//! Single-transfer orchestration: resolve, fetch, parse, persist.
//!
//! [`HttpClient::download`] is the per-target boundary. Every failure below it
//! is turned into a failed [`TransferResult`] and a warning log; nothing
//! propagates to the runners as an error.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio_rustls::rustls;
use tracing::{debug, info, instrument, warn};

use super::constants::TRANSFER_TIMEOUT_SECS;
use super::error::DownloadError;
use super::filename::output_path_for;
use super::report::TransferResult;
use super::response::RawResponse;
use super::transport::Transport;
use crate::parser::resolve_url;
use crate::queue::Target;

/// Settings for [`HttpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connect, handshake, write and per-read timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(TRANSFER_TIMEOUT_SECS),
        }
    }
}

/// Error building an [`HttpClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TLS client configuration could not be built.
    #[error("failed to build TLS configuration: {0}")]
    TlsConfig(#[from] rustls::Error),
}

/// HTTP client that downloads one target per call over a fresh connection.
///
/// Cheap to clone; clones share the TLS configuration.
///
/// # Example
///
/// ```no_run
/// use batchget_core::download::HttpClient;
/// use batchget_core::queue::Target;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let result = client.download(&Target::new("https://example.com/index.html")).await;
/// println!("success={} bytes={}", result.success, result.bytes);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Transport,
}

impl HttpClient {
    /// Creates a client with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TlsConfig`] if TLS setup fails.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TlsConfig`] if TLS setup fails.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            transport: Transport::new(config.timeout)?,
        })
    }

    /// Returns the transfer timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Downloads one target and reports the outcome.
    ///
    /// Never fails: errors become a result with `success == false`,
    /// zero elapsed time and zero bytes, and are logged at warn level.
    #[instrument(skip(self, target), fields(url = %target.url))]
    pub async fn download(&self, target: &Target) -> TransferResult {
        let started = Instant::now();
        match self.try_download(target).await {
            Ok((path, bytes)) => {
                let elapsed = started.elapsed();
                info!(
                    path = %path.display(),
                    bytes,
                    elapsed_ms = elapsed.as_millis(),
                    "download completed"
                );
                TransferResult::succeeded(&target.url, elapsed, bytes, path)
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "download failed");
                TransferResult::failed(&target.url, &e)
            }
        }
    }

    /// Downloads one target, returning the written path and body size.
    ///
    /// # Errors
    ///
    /// Returns the [`DownloadError`] of the first failing stage; no file is
    /// written unless the response was a well-formed 200.
    pub async fn try_download(&self, target: &Target) -> Result<(PathBuf, u64), DownloadError> {
        let parsed = resolve_url(&target.url)?;
        debug!(authority = %parsed.authority(), path = %parsed.path, "resolved");

        let raw = self.transport.fetch(&parsed).await?;
        let response = RawResponse::parse(&target.url, &raw)?;
        drop(raw);
        debug!(status_line = %response.status_line, headers = response.headers.len(), "parsed response");

        let body = response.into_ok_body(&target.url)?;

        let path = target
            .output
            .clone()
            .unwrap_or_else(|| output_path_for(&target.url, None));
        write_body(&path, &body).await?;

        Ok((path, body.len() as u64))
    }
}

/// Writes `body` to `path`, creating missing parent directories.
async fn write_body(path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }
    tokio::fs::write(path, body)
        .await
        .map_err(|e| DownloadError::io(path, e))
}
