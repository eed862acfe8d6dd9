//! Output filename derivation for targets without an explicit path.
//!
//! Single and batch downloads share one rule: the last URL path segment,
//! percent-decoded and sanitized, or `file_<hash>.html` when the URL has no
//! usable segment (root path, trailing slash, unparseable URL). The hash is a
//! SHA-256 prefix of the full URL string, so the same URL always maps to the
//! same name.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

use super::constants::FALLBACK_HASH_LEN;

/// Derives the output filename for a URL.
///
/// ```
/// use batchget_core::download::derive_filename;
///
/// assert_eq!(derive_filename("http://host/docs/a%20b.html"), "a b.html");
/// assert!(derive_filename("http://host/").starts_with("file_"));
/// ```
#[must_use]
pub fn derive_filename(url: &str) -> String {
    let trimmed = url.trim();
    let candidate = if trimmed.starts_with("//") {
        format!("http:{trimmed}")
    } else {
        trimmed.to_string()
    };

    let segment = Url::parse(&candidate).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(ToString::to_string))
    });

    match segment {
        Some(last) if !last.is_empty() => {
            let decoded = urlencoding::decode(&last).map_or(last.clone(), |d| d.into_owned());
            let sanitized = sanitize_filename(&decoded);
            if sanitized.trim_matches('_').is_empty() {
                fallback_filename(trimmed)
            } else {
                sanitized
            }
        }
        _ => fallback_filename(trimmed),
    }
}

/// Deterministic name for URLs without a usable path segment.
#[must_use]
pub fn fallback_filename(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    format!("file_{}.html", &digest[..FALLBACK_HASH_LEN])
}

/// Resolves where a URL's body is written: `dir/<derived>` or `./<derived>`.
#[must_use]
pub fn output_path_for(url: &str, dir: Option<&Path>) -> PathBuf {
    let name = derive_filename(url);
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
