//! Subscriber setup
//!
//! Logs go to stdout through `tracing-subscriber`'s fmt layer. The filter comes
//! from `RUST_LOG` when set, otherwise from the configured directive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor configuration provide one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Builds the effective filter.
///
/// An unparsable directive falls back to `DEFAULT_LOG_FILTER` instead of
/// failing startup.
pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber.
///
/// Returns false if one was already installed (tests, embedding).
pub fn init_logging(directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(build_filter(directive))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}
