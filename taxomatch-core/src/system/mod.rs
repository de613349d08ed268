pub mod logging;
pub mod progress;

// Re-export commonly used functions
pub use logging::{init_logging, log_filter, LOG_ENV_VAR};
pub use progress::{create_progress_bar, create_spinner};
