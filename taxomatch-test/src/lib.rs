//! Test utilities for the taxomatch workspace
//!
//! Common helpers shared by the integration tests of the other crates:
//!
//! - **Fixtures**: a small tree of life with homonyms, synonyms, suppressed and deprecated taxa
//! - **Storage**: in-memory taxonomies taken to a given build stage
//! - **Environment**: temporary directories holding config files
//! - **Assertions**: checks over index contents and result ordering

pub mod assertions;
pub mod environment;
pub mod fixtures;
pub mod storage;

// Re-export commonly used items
pub use environment::TestEnvironment;
pub use fixtures::{fixture_config, ott, tree_of_life, TaxonBuilder, TaxonomyFixture};
pub use storage::{built_taxonomy, loaded_taxonomy, node_for, synthesized_taxonomy, TestTaxonomy};

pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (call once per test module)
pub fn init_test_logging() {
    taxomatch_core::init_logging("warn");
}

/// Run a test with a clean temporary environment
///
/// # Example
/// ```rust
/// use taxomatch_test::with_test_env;
///
/// with_test_env(|env| {
///     let path = env.write_config(&taxomatch_test::fixture_config())?;
///     assert!(path.exists());
///     Ok(())
/// })
/// .unwrap();
/// ```
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
