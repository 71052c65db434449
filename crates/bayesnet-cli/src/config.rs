//! Configuration file support for the bayesnet CLI
//!
//! Supports loading configuration from .bayesnetrc files in:
//! - Custom path via environment variable
//! - Current directory
//! - User home directory

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".bayesnetrc";
pub const CONFIG_ENV: &str = "BAYESNET_CONFIG";

/// Configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Algorithm selector used by `query` when `-a` is omitted
    pub default_algorithm: u32,

    /// Decimal places of rendered probabilities
    pub precision: usize,

    /// Worker threads for batch runs
    pub jobs: usize,

    /// Enable colored output
    pub colored: bool,

    /// Log filter used when RUST_LOG is unset
    pub log_level: String,

    /// Show a progress bar during batch runs
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_algorithm: 2,
            precision: 5,
            jobs: 1,
            colored: true,
            log_level: "warn".to_string(),
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Find and load configuration file
    ///
    /// Search order:
    /// 1. BAYESNET_CONFIG environment variable
    /// 2. .bayesnetrc in current directory
    /// 3. .bayesnetrc in user home directory
    ///
    /// Unreadable or invalid files are skipped.
    pub fn load_default() -> Self {
        Self::search_paths()
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from(CONFIG_FILE));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE));
        }
        paths
    }

    /// Get configuration file path (environment, current, or home)
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let current = PathBuf::from(CONFIG_FILE);
        if current.exists() {
            return current;
        }

        match dirs::home_dir() {
            Some(home) => home.join(CONFIG_FILE),
            None => current,
        }
    }

    /// Create a default configuration file
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path();
        Self::default().save(&path)?;
        Ok(path)
    }
}
