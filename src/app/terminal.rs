//! Log level selection, tracing setup and terminal capability checks.

/// Maps the verbosity flags to a default filter directive.
///
/// Warnings (per-URL failures) are visible by default; `-v` adds progress
/// logs, `-vv` per-worker debug output.
pub(crate) fn resolve_default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

/// The spinner would interleave with log lines, so it only runs when nothing
/// else writes to stderr.
pub(crate) fn should_use_spinner(
    stderr_is_terminal: bool,
    quiet: bool,
    verbose: u8,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && verbose == 0 && !dumb_terminal
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the CLI default.
pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
