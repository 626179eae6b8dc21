//! Logging setup
//!
//! Job outcomes, rejections and barrier handshakes are emitted as `tracing`
//! events. They go to stderr so that stdout carries only the balance report.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level` when it is set.
pub fn init_logging(level: &str, use_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        let layer = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .with_ansi(false);
        registry.with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_target(false)
            .with_thread_names(true)
            .with_writer(std::io::stderr);
        registry.with(layer).init();
    }
}
