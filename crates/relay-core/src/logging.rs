//! `tracing` subscriber setup.
//!
//! Context such as the subscriber id of a stream session travels in spans,
//! so every line logged inside a session carries it.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor settings specify one.
pub const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Later calls are no-ops.
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
