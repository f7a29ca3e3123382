//! Logging setup for hosts without a subscriber of their own.

use crate::constants::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV};
use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber.
///
/// The filter comes from `MEDIABOOT_LOG` (e.g. `mediaboot=debug`) and
/// defaults to `info`. Returns false if a global subscriber is already set,
/// which makes repeated calls harmless.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
