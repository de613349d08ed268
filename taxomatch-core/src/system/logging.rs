//! Tracing subscriber setup

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Environment variable holding a tracing filter directive, e.g. `taxomatch_taxonomy=debug`
pub const LOG_ENV_VAR: &str = "TAXOMATCH_LOG";

/// Build the filter from TAXOMATCH_LOG, falling back to `default_level`
pub fn log_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global fmt subscriber. Later calls are no-ops.
pub fn init_logging(default_level: &str) {
    let filter = log_filter(default_level);
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
