//! Constants for the download module (timeouts, buffer sizes, naming).

use std::time::Duration;

/// Default connect and per-read timeout for a transfer (30 seconds).
pub const TRANSFER_TIMEOUT_SECS: u64 = 30;

/// Default bounded wait when joining workers at shutdown.
pub const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Separator between the header block and the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Required prefix of a valid status line.
pub const STATUS_LINE_PREFIX: &str = "HTTP/1.";

/// Number of hex digits of the URL hash used in fallback filenames.
pub const FALLBACK_HASH_LEN: usize = 8;
