// ── Tracing setup ──
//
// Library code only emits events; binaries and test harnesses opt in to
// output by calling `init_tracing` once.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "info" } else { "error" }
}

/// Install a fmt subscriber. `RUST_LOG` takes precedence; otherwise
/// `info` when `verbose`, `error` when not.
///
/// Returns whether this call installed the subscriber; later calls are
/// no-ops and return `false`.
pub fn init_tracing(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_target(false)
        .try_init()
        .is_ok()
}
