//! Logging initialization.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise defaults to `info` globally with
/// debug output from the engine crates.
///
/// # Example
/// ```
/// mocha_core::init_logging();
/// tracing::info!("engine starting");
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mocha_rhi=debug,mocha_renderer=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
