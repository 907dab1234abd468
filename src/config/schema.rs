//! Configuration schema types for `superxbr.toml`
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::discovery::default_extensions;
use crate::xbr::UpscaleOptions;

/// Progress output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressFormat {
    /// Human-readable lines on stderr
    #[default]
    Console,
    /// One JSON object per line on stderr
    Json,
}

/// `[upscale]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpscaleConfig {
    /// Run the corner pass on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self { parallel: default_true() }
    }
}

impl UpscaleConfig {
    /// Options for the upscaler.
    pub fn options(&self) -> UpscaleOptions {
        UpscaleOptions { parallel: self.parallel }
    }
}

/// `[batch]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of images processed concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// File extensions picked up from directories and glob patterns
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Leave images whose output file already exists alone
    #[serde(default)]
    pub skip_existing: bool,
    /// Stop starting new images after the first failure
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            extensions: default_extensions(),
            skip_existing: false,
            fail_fast: false,
        }
    }
}

/// `[progress]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Output format
    #[serde(default)]
    pub format: ProgressFormat,
    /// Report every image start, not just completions
    #[serde(default)]
    pub verbose: bool,
    /// Colored console output (only when stderr is a terminal)
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { format: ProgressFormat::default(), verbose: false, color: default_true() }
    }
}

fn default_true() -> bool {
    true
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Complete superxbr.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperxbrConfig {
    /// Upscaler settings
    #[serde(default)]
    pub upscale: UpscaleConfig,
    /// Batch settings
    #[serde(default)]
    pub batch: BatchConfig,
    /// Progress output settings
    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "batch.jobs")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "superxbr.toml: '{}' {}", self.field, self.message)
    }
}

impl SuperxbrConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.batch.jobs == 0 {
            errors.push(ConfigValidationError {
                field: "batch.jobs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.batch.extensions.is_empty() {
            errors.push(ConfigValidationError {
                field: "batch.extensions".to_string(),
                message: "must contain at least one extension".to_string(),
            });
        }

        for (i, ext) in self.batch.extensions.iter().enumerate() {
            if ext.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("batch.extensions[{}]", i),
                    message: "must be a non-empty string".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: SuperxbrConfig = toml::from_str("").unwrap();
        assert_eq!(config, SuperxbrConfig::default());
        assert!(config.upscale.parallel);
        assert!(config.batch.jobs >= 1);
        assert!(config.batch.extensions.contains(&"png".to_string()));
        assert!(!config.batch.skip_existing);
        assert!(!config.batch.fail_fast);
        assert_eq!(config.progress.format, ProgressFormat::Console);
        assert!(config.progress.color);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[upscale]
parallel = false

[batch]
jobs = 3
extensions = ["png", "qoi"]
skip_existing = true
fail_fast = true

[progress]
format = "json"
verbose = true
color = false
"#;
        let config: SuperxbrConfig = toml::from_str(toml).unwrap();
        assert!(!config.upscale.parallel);
        assert!(!config.upscale.options().parallel);
        assert_eq!(config.batch.jobs, 3);
        assert_eq!(config.batch.extensions, vec!["png", "qoi"]);
        assert!(config.batch.skip_existing);
        assert!(config.batch.fail_fast);
        assert_eq!(config.progress.format, ProgressFormat::Json);
        assert!(config.progress.verbose);
        assert!(!config.progress.color);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: SuperxbrConfig = toml::from_str("[batch]\nfail_fast = true\n").unwrap();
        assert!(config.batch.fail_fast);
        assert_eq!(config.batch.extensions, default_extensions());
        assert!(config.upscale.parallel);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<SuperxbrConfig, _> = toml::from_str("[progress]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = SuperxbrConfig::default();
        config.batch.jobs = 0;
        config.batch.extensions = vec!["png".to_string(), " ".to_string()];

        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "batch.jobs");
        assert_eq!(errors[1].field, "batch.extensions[1]");
        assert_eq!(errors[0].to_string(), "superxbr.toml: 'batch.jobs' must be a positive integer");
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = SuperxbrConfig::default();
        config.batch.extensions.clear();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "batch.extensions");
    }
}
