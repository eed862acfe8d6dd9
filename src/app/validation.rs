//! Argument validation that runs before any transfer starts.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// What the user asked to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// One URL given with `-u`.
    Single { url: String },
    /// A URL list file given with `-f`.
    Batch { file: PathBuf },
}

/// Requires exactly one of `-u` and `-f`.
pub(crate) fn resolve_input_mode(url: Option<&str>, file: Option<&Path>) -> Result<InputMode> {
    match (url, file) {
        (Some(_), Some(_)) => bail!("Cannot specify both -u (URL) and -f (file)"),
        (None, None) => bail!("Must specify either -u (URL) or -f (file)"),
        (Some(url), None) => {
            if url.trim().is_empty() {
                bail!("URL given with -u is empty");
            }
            Ok(InputMode::Single {
                url: url.trim().to_string(),
            })
        }
        (None, Some(file)) => Ok(InputMode::Batch {
            file: file.to_path_buf(),
        }),
    }
}
