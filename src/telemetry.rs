//! Diagnostic logging setup

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output for this crate when `verbose` is on. Logs go to stderr so that
/// `--json` output on stdout stays machine-readable.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,sequential_publisher=debug"
    } else {
        "warn"
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
