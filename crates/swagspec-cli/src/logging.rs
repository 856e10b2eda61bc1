//! Log setup: `RUST_LOG` wins, otherwise `warn` or (verbose) `debug` for our crates

use anyhow::Result;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_DIRECTIVES: &str = "warn,swagspec=debug,swagspec_core=debug,swagspec_runner=debug";

/// Install a stderr `fmt` subscriber.
///
/// # Errors
///
/// Returns error if a global subscriber is already set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_DIRECTIVES } else { "warn" })
    });

    let layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot initialize logging: {e}"))
}
