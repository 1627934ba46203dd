//! Logging setup for the `prunescope` binary.
//!
//! Library code only emits `tracing` events; this module installs the
//! subscriber. Logs go to stderr so a report written to stdout stays clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "prunescope=info";

/// Builds the filter for the given flags.
///
/// Precedence: `verbose`, then `quiet`, then `RUST_LOG`, then the default
/// of INFO for this crate.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("prunescope=debug")
    } else if quiet {
        EnvFilter::new("prunescope=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initializes the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert_eq!(build_filter(true, true).to_string(), "prunescope=debug");
    }

    #[test]
    fn test_quiet_filter() {
        assert_eq!(build_filter(false, true).to_string(), "prunescope=error");
    }
}
