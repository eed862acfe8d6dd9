//! Input parsing: URL resolution and URL list files.
//!
//! # Example
//!
//! ```
//! use batchget_core::parser::{parse_url_list, resolve_url};
//!
//! let urls = parse_url_list("http://example.com/a.html\n# skipped\n");
//! let parsed = resolve_url(&urls[0]).unwrap();
//! assert_eq!(parsed.hostname, "example.com");
//! assert_eq!(parsed.port, 80);
//! ```

mod error;
mod input;
mod url;

pub use error::{InputError, UrlError};
pub use input::{parse_url_list, read_url_file};
pub use url::{ParsedUrl, Scheme, resolve_url};
