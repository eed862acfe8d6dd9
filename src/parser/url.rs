//! URL resolution into connection parameters.
//!
//! Turns a URL string into the (scheme, hostname, port, request path) tuple
//! the transport needs. The request path carries the query string, since the
//! wire format does not distinguish the two.

use std::fmt;

use tracing::trace;
use url::{Host, Url};

use super::error::UrlError;

/// Supported URL schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain-text HTTP
    Http,
    /// HTTP over TLS
    Https,
}

impl Scheme {
    /// Returns the well-known port for this scheme.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// Returns true when connections must be wrapped in TLS.
    #[must_use]
    pub fn is_tls(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// A URL reduced to what a single GET request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Connection scheme
    pub scheme: Scheme,
    /// Hostname or IP literal, never empty, IPv6 without brackets
    pub hostname: String,
    /// Port to connect to (1-65535)
    pub port: u16,
    /// Request target: path plus `?query` when present, never empty
    pub path: String,
}

impl ParsedUrl {
    /// Returns the `host:port` pair for log output.
    #[must_use]
    pub fn authority(&self) -> String {
        if self.hostname.contains(':') {
            format!("[{}]:{}", self.hostname, self.port)
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }
}

/// Resolves a URL string into connection parameters.
///
/// Rules:
/// - a scheme-relative `//host/path` input is treated as `http`
/// - only `http` and `https` are accepted
/// - a missing hostname is a hard failure
/// - a missing port becomes 443 for `https`, 80 otherwise
/// - a missing path becomes `/`, and a query is appended as `?query`
///
/// # Errors
///
/// Returns [`UrlError`] when the URL is malformed, hostless, uses an
/// unsupported scheme or names port 0.
///
/// # Examples
///
/// ```
/// use batchget_core::parser::{Scheme, resolve_url};
///
/// let parsed = resolve_url("https://example.com/search?q=rust").unwrap();
/// assert_eq!(parsed.scheme, Scheme::Https);
/// assert_eq!(parsed.port, 443);
/// assert_eq!(parsed.path, "/search?q=rust");
/// ```
pub fn resolve_url(input: &str) -> Result<ParsedUrl, UrlError> {
    let trimmed = input.trim();
    let candidate = if trimmed.starts_with("//") {
        format!("http:{trimmed}")
    } else {
        trimmed.to_string()
    };

    let url = Url::parse(&candidate).map_err(|e| match e {
        url::ParseError::EmptyHost => UrlError::missing_host(trimmed),
        other => UrlError::malformed(trimmed, other),
    })?;

    let scheme = match url.scheme() {
        "http" => Scheme::Http,
        "https" => Scheme::Https,
        other => return Err(UrlError::unsupported_scheme(trimmed, other)),
    };

    let hostname = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return Err(UrlError::missing_host(trimmed)),
    };

    let port = url.port().unwrap_or_else(|| scheme.default_port());
    if port == 0 {
        return Err(UrlError::InvalidPort {
            url: trimmed.to_string(),
            port,
        });
    }

    let mut path = match url.path() {
        "" => "/".to_string(),
        p => p.to_string(),
    };
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    trace!(%scheme, %hostname, port, %path, "resolved URL");

    Ok(ParsedUrl {
        scheme,
        hostname,
        port,
        path,
    })
}
