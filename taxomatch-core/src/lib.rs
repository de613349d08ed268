//! Core utilities and types shared across all taxomatch crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use config::{default_config_path, load_config, load_default_config, save_config, Config};
pub use error::{TaxomatchError, TaxomatchResult};

// Re-export core types
pub use types::{evaluate_flags, FlagEvaluation, NodeId, Nomenclature, OttId, Rank, TaxonFlag};

// Re-export system utilities
pub use system::{create_progress_bar, create_spinner, init_logging};

/// Version information for the taxomatch project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
