//! Error types for the download module.
//!
//! Every stage of a transfer (resolve, connect, request, parse, persist) has
//! its own variants, and each variant maps onto one [`FailureKind`] so callers
//! can report failures without matching on transport details.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::parser::UrlError;

/// Coarse classification of a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed or hostless URL
    Resolution,
    /// Socket, TLS or timeout failure
    Connection,
    /// Response framing or status line violation
    Protocol,
    /// Non-200 status code
    Status,
    /// Filesystem write or mkdir failure
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Resolution => "resolution",
            Self::Connection => "connection",
            Self::Protocol => "protocol",
            Self::Status => "status",
            Self::Io => "io",
        };
        f.write_str(label)
    }
}

/// Errors that can occur during a single transfer.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL could not be resolved into connection parameters.
    #[error(transparent)]
    Resolution(#[from] UrlError),

    /// TCP connection could not be established.
    #[error("failed to connect to {authority}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        authority: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// TLS handshake or certificate verification failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        /// Hostname used for verification.
        host: String,
        /// The underlying TLS error.
        #[source]
        source: std::io::Error,
    },

    /// Hostname is not usable as a TLS server name.
    #[error("invalid TLS server name: {host}")]
    InvalidServerName {
        /// The rejected hostname.
        host: String,
    },

    /// Connect or read did not finish within the transfer timeout.
    #[error("timeout during {phase} with {authority}")]
    Timeout {
        /// `host:port` of the peer.
        authority: String,
        /// Which step timed out.
        phase: &'static str,
    },

    /// Socket error while sending the request or reading the response.
    #[error("network error with {authority}: {source}")]
    Network {
        /// `host:port` of the peer.
        authority: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Response has no header/body separator.
    #[error("invalid response from {url}: missing header terminator")]
    MalformedResponse {
        /// The URL that produced the response.
        url: String,
    },

    /// Status line does not start with `HTTP/1.` or has no numeric code.
    #[error("invalid HTTP response from {url}: status line {status_line:?}")]
    InvalidStatusLine {
        /// The URL that produced the response.
        url: String,
        /// The offending status line.
        status_line: String,
    },

    /// Server answered with a status other than 200.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while persisting the body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a connect error.
    pub fn connect(authority: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            authority: authority.into(),
            source,
        }
    }

    /// Creates a TLS handshake error.
    pub fn tls(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Tls {
            host: host.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(authority: impl Into<String>, phase: &'static str) -> Self {
        Self::Timeout {
            authority: authority.into(),
            phase,
        }
    }

    /// Creates a network error.
    pub fn network(authority: impl Into<String>, source: std::io::Error) -> Self {
        Self::Network {
            authority: authority.into(),
            source,
        }
    }

    /// Creates a malformed response error.
    pub fn malformed_response(url: impl Into<String>) -> Self {
        Self::MalformedResponse { url: url.into() }
    }

    /// Creates an invalid status line error.
    pub fn invalid_status_line(url: impl Into<String>, status_line: impl Into<String>) -> Self {
        Self::InvalidStatusLine {
            url: url.into(),
            status_line: status_line.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the failure classification for this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Resolution(_) => FailureKind::Resolution,
            Self::Connect { .. }
            | Self::Tls { .. }
            | Self::InvalidServerName { .. }
            | Self::Timeout { .. }
            | Self::Network { .. } => FailureKind::Connection,
            Self::MalformedResponse { .. } | Self::InvalidStatusLine { .. } => {
                FailureKind::Protocol
            }
            Self::HttpStatus { .. } => FailureKind::Status,
            Self::Io { .. } => FailureKind::Io,
        }
    }
}

// Socket and filesystem errors need the peer or path for context, so there is
// no `From<std::io::Error>`; use the constructors above.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("http://host/missing", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("http://host/missing"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("example.com:80", "read");
        let msg = error.to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("read"));
        assert!(msg.contains("example.com:80"));
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/out.html"), io_error);
        assert!(error.to_string().contains("/tmp/out.html"));
    }

    #[test]
    fn test_download_error_resolution_is_transparent() {
        let error = DownloadError::from(UrlError::missing_host("http://"));
        assert_eq!(error.to_string(), "invalid URL 'http://': no hostname");
    }

    #[test]
    fn test_download_error_kind_mapping() {
        let refused = || std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let cases = [
            (
                DownloadError::from(UrlError::missing_host("http://")),
                FailureKind::Resolution,
            ),
            (
                DownloadError::connect("h:80", refused()),
                FailureKind::Connection,
            ),
            (DownloadError::tls("h", refused()), FailureKind::Connection),
            (DownloadError::timeout("h:80", "connect"), FailureKind::Connection),
            (DownloadError::network("h:80", refused()), FailureKind::Connection),
            (DownloadError::malformed_response("u"), FailureKind::Protocol),
            (
                DownloadError::invalid_status_line("u", "SPDY/3 200"),
                FailureKind::Protocol,
            ),
            (DownloadError::http_status("u", 500), FailureKind::Status),
            (DownloadError::io("p", refused()), FailureKind::Io),
        ];
        for (error, expected) in cases {
            assert_eq!(error.kind(), expected, "{error}");
        }
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Protocol.to_string(), "protocol");
        assert_eq!(FailureKind::Io.to_string(), "io");
    }
}
