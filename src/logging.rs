//! Logging initialization
//!
//! Diagnostics go to stderr through `tracing`, so stdout carries only the
//! formatted results. The filter is taken from, in order:
//! - `MONOVER_LOG`
//! - `RUST_LOG`
//! - the `--verbose` / `--quiet` flags (`debug` / `error`, default `warn`)

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "MONOVER_LOG";

/// Picks the filter directive from the environment values and CLI flags
pub fn filter_directive(
    monover_log: Option<String>,
    rust_log: Option<String>,
    verbose: bool,
    quiet: bool,
) -> String {
    let from_env = monover_log
        .into_iter()
        .chain(rust_log)
        .find(|value| !value.trim().is_empty());
    if let Some(directive) = from_env {
        return directive;
    }

    if quiet {
        "error".to_string()
    } else if verbose {
        "debug".to_string()
    } else {
        "warn".to_string()
    }
}

/// Installs the global subscriber.
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(verbose: bool, quiet: bool, color: bool) {
    let directive = filter_directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        verbose,
        quiet,
    );
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_ansi(color),
        )
        .with(env_filter)
        .try_init();
}
