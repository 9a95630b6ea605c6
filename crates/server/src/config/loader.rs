//! Configuration file loading and parsing
//!
//! Looks for a RON config file in the standard locations and falls back to
//! defaults when none exists.

use super::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WORKSPACES_CONFIG_PATH";

/// Standard config file names to search for
const CONFIG_FILENAMES: &[&str] = &["workspaces.ron", ".workspaces/config.ron"];

/// Load configuration from a specific file path
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_ron(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration with automatic file discovery
///
/// Searches, in order:
/// 1. Path in the WORKSPACES_CONFIG_PATH environment variable
/// 2. workspaces.ron in the current directory
/// 3. .workspaces/config.ron relative to the current directory
///
/// Returns the default configuration if nothing is found.
pub fn load_with_discovery() -> Result<Config> {
    if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            tracing::info!("Loading config from {}: {}", CONFIG_PATH_ENV, path.display());
            return load_from_file(&path);
        } else {
            tracing::warn!(
                "{} specified but file not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            );
        }
    }

    for filename in CONFIG_FILENAMES {
        let path = PathBuf::from(filename);
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            return load_from_file(&path);
        }
    }

    tracing::info!("No config file found, using defaults");
    Ok(Config::default())
}

/// Parse and validate a RON configuration string
fn parse_ron(content: &str) -> Result<Config> {
    let config: Config = ron::from_str(content).context("Failed to parse RON configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}
