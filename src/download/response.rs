//! Response framing: status line, raw header lines and body.

use super::constants::{HEADER_TERMINATOR, STATUS_LINE_PREFIX};
use super::error::DownloadError;

/// A response split at the first blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// First line of the header block, e.g. `HTTP/1.1 200 OK`.
    pub status_line: String,
    /// Remaining header lines, in wire order, unparsed.
    pub headers: Vec<String>,
    /// Everything after the header terminator, verbatim.
    pub body: Vec<u8>,
    /// Numeric status code from the status line.
    pub status: u16,
}

impl RawResponse {
    /// Splits raw response bytes and validates the status line.
    ///
    /// `url` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MalformedResponse`] if there is no `\r\n\r\n`
    /// and [`DownloadError::InvalidStatusLine`] if the status line does not
    /// start with `HTTP/1.` or lacks a numeric code.
    pub fn parse(url: &str, raw: &[u8]) -> Result<Self, DownloadError> {
        let split = raw
            .windows(HEADER_TERMINATOR.len())
            .position(|window| window == HEADER_TERMINATOR)
            .ok_or_else(|| DownloadError::malformed_response(url))?;

        let head = String::from_utf8_lossy(&raw[..split]);
        let body = raw[split + HEADER_TERMINATOR.len()..].to_vec();

        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default().to_string();
        if !status_line.starts_with(STATUS_LINE_PREFIX) {
            return Err(DownloadError::invalid_status_line(url, status_line));
        }

        let Some(status) = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse::<u16>().ok())
        else {
            return Err(DownloadError::invalid_status_line(url, status_line));
        };

        Ok(Self {
            headers: lines.map(ToString::to_string).collect(),
            status_line,
            body,
            status,
        })
    }

    /// Returns the body if the status is 200.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::HttpStatus`] for any other status.
    pub fn into_ok_body(self, url: &str) -> Result<Vec<u8>, DownloadError> {
        if self.status == 200 {
            Ok(self.body)
        } else {
            Err(DownloadError::http_status(url, self.status))
        }
    }
}
