//! Tracing setup for the charm binary.

use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so replay output on stdout stays machine-readable;
/// `RUST_LOG` overrides the default INFO filter.
pub fn init() {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    registry().with(fmt_layer).init();
}
