//! Error types for URL resolution and input parsing.

use thiserror::Error;

/// Errors that can occur while resolving a URL into connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// URL could not be parsed at all.
    #[error("invalid URL '{url}': {reason}")]
    Malformed {
        /// The URL that failed to parse
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// URL parsed but carries no hostname.
    #[error("invalid URL '{url}': no hostname")]
    MissingHost {
        /// The hostless URL
        url: String,
    },

    /// URL uses a scheme other than http or https.
    #[error("invalid URL '{url}': scheme '{scheme}' is not supported, use http:// or https://")]
    UnsupportedScheme {
        /// The offending URL
        url: String,
        /// The scheme found in the URL
        scheme: String,
    },

    /// Explicit port is outside 1-65535.
    #[error("invalid URL '{url}': port {port} is out of range")]
    InvalidPort {
        /// The offending URL
        url: String,
        /// The rejected port
        port: u16,
    },
}

impl UrlError {
    /// Creates a `Malformed` error from a parse failure.
    #[must_use]
    pub fn malformed(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `MissingHost` error.
    #[must_use]
    pub fn missing_host(url: &str) -> Self {
        Self::MissingHost {
            url: url.to_string(),
        }
    }

    /// Creates an `UnsupportedScheme` error.
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::UnsupportedScheme {
            url: url.to_string(),
            scheme: scheme.to_string(),
        }
    }
}

/// Errors raised while reading a URL list.
#[derive(Debug, Error)]
pub enum InputError {
    /// The list file could not be read.
    #[error("error reading URL file {path}: {source}")]
    Read {
        /// Path of the list file
        path: std::path::PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The list contained no usable URLs.
    #[error("no URLs found in {path}")]
    Empty {
        /// Path of the list file
        path: std::path::PathBuf,
    },
}
