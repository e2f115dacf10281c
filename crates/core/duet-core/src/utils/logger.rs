//! Logging utilities

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `DUET_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the directive string handed to the env filter
fn log_directive() -> String {
    std::env::var("DUET_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

/// Initialize the global logging system
///
/// `RUST_LOG` wins over `DUET_LOG_LEVEL`. Calling this twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_logging() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_directive().into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
