//! Units of work carried by the task queue.

use std::fmt;
use std::path::PathBuf;

/// One URL to fetch plus an optional destination path.
///
/// Without an explicit path the body is written to a name derived from the URL
/// in the current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// URL to fetch
    pub url: String,
    /// Where to write the body, if chosen by the caller
    pub output: Option<PathBuf>,
}

impl Target {
    /// Creates a target with a derived output path.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output: None,
        }
    }

    /// Sets an explicit output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            Some(path) => write!(f, "{} -> {}", self.url, path.display()),
            None => f.write_str(&self.url),
        }
    }
}

/// An entry in the task queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Fetch a target.
    Fetch(Target),
    /// Stop the worker that pops this; one is pushed per worker.
    Stop,
}

impl Task {
    /// Returns true for the stop sentinel.
    #[must_use]
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}
