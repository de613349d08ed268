//! Test environment management
//!
//! Temporary directories with automatic cleanup.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use taxomatch_core::{save_config, Config};

/// Isolated directory removed when dropped
pub struct TestEnvironment {
    temp_dir: Option<TempDir>,
    root_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("taxomatch-test").context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();
        Ok(Self {
            temp_dir: Some(temp_dir),
            root_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Path a config file would live at
    pub fn config_path(&self) -> PathBuf {
        self.root_path.join("config.toml")
    }

    /// Save `config` as TOML and return its path
    pub fn write_config(&self, config: &Config) -> Result<PathBuf> {
        let path = self.config_path();
        save_config(&path, config).context("Failed to save test config")?;
        Ok(path)
    }

    pub fn write_file(&self, path: impl AsRef<Path>, content: &[u8]) -> Result<PathBuf> {
        let full_path = self.root_path.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)?;
        Ok(full_path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.root_path.join(path))?)
    }

    /// Keep the directory after the test for inspection
    pub fn preserve(&mut self) -> Option<PathBuf> {
        let path = self.temp_dir.take()?.keep();
        println!("Test environment preserved at: {}", path.display());
        Some(path)
    }
}
