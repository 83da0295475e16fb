//! Tracing subscriber setup for binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the executable.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "internflow=info";

/// Installs a formatting subscriber writing to stderr.
///
/// Does nothing when a global subscriber is already installed.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
