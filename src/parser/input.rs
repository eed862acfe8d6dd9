//! URL list input: one URL per line, `#` comments and blank lines ignored.

use std::path::Path;

use tracing::{debug, instrument};

use super::error::InputError;

/// Extracts URLs from list text.
///
/// Each line is trimmed; empty lines and lines starting with `#` are skipped.
/// No other escaping is applied and URLs are not validated here, so a bad
/// line still becomes a target and fails at resolution time.
///
/// ```
/// use batchget_core::parser::parse_url_list;
///
/// let urls = parse_url_list("# mirrors\nhttp://a/x\n\n  http://b/y  \n");
/// assert_eq!(urls, vec!["http://a/x", "http://b/y"]);
/// ```
#[must_use]
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Reads a URL list file.
///
/// # Errors
///
/// Returns [`InputError::Read`] if the file cannot be read as UTF-8 text and
/// [`InputError::Empty`] if it holds no URLs.
#[instrument(fields(path = %path.display()))]
pub fn read_url_file(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let urls = parse_url_list(&text);
    if urls.is_empty() {
        return Err(InputError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!(count = urls.len(), "read URL list");
    Ok(urls)
}
