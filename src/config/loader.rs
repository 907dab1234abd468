//! Configuration loading and discovery for `superxbr.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{ProgressFormat, SuperxbrConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "superxbr.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse superxbr.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    /// Disable the parallel corner pass
    pub sequential: Option<bool>,
    /// Skip images whose output exists
    pub skip_existing: Option<bool>,
    /// Stop after the first failure
    pub fail_fast: Option<bool>,
    /// Emit JSON progress
    pub json: Option<bool>,
    /// Verbose progress
    pub verbose: Option<bool>,
    /// Disable colors
    pub no_color: Option<bool>,
}

/// Find superxbr.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for superxbr.toml
/// 2. Check XDG_CONFIG_HOME/superxbr/superxbr.toml (or ~/.config/superxbr/superxbr.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find superxbr.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("superxbr").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find superxbr.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, [`find_config`] is used and
/// a missing file yields [`SuperxbrConfig::default`].
pub fn load_config(path: Option<&Path>) -> Result<SuperxbrConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(SuperxbrConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<SuperxbrConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SuperxbrConfig = toml::from_str(&contents)?;
    check(&config)?;
    Ok(config)
}

fn check(config: &SuperxbrConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged
/// configuration is validated again.
pub fn merge_cli_overrides(
    config: &mut SuperxbrConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(jobs) = overrides.jobs {
        config.batch.jobs = jobs;
    }
    if let Some(true) = overrides.sequential {
        config.upscale.parallel = false;
    }
    if let Some(skip_existing) = overrides.skip_existing {
        config.batch.skip_existing = skip_existing;
    }
    if let Some(fail_fast) = overrides.fail_fast {
        config.batch.fail_fast = fail_fast;
    }
    if let Some(true) = overrides.json {
        config.progress.format = ProgressFormat::Json;
    }
    if let Some(verbose) = overrides.verbose {
        config.progress.verbose = verbose;
    }
    if let Some(true) = overrides.no_color {
        config.progress.color = false;
    }

    check(config)
}
