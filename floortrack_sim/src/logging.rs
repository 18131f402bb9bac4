// floortrack_sim/src/logging.rs

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Our crates at debug, everything else at info.
pub const DEFAULT_FILTER: &str = "info,floortrack_core=debug,floortrack_sim=debug";

/// Installs the global subscriber. `RUST_LOG` wins over `fallback`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}
