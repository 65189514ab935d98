//! Configuration loading for DocDrift
//!
//! Settings live in `.docdrift.toml` at the repository root; every field
//! is optional and falls back to the defaults below.

use crate::drift::comparator::{default_ignore_patterns, CompareConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".docdrift.toml";

/// Invalid configuration values. The only error class that is fatal to
/// an invocation; everything else degrades to per-file error entries.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error("unsupported severity value: {0}")]
    UnknownSeverity(String),
}

/// Exclude patterns applied when neither the config file nor the CLI
/// provides any
pub fn default_exclude_patterns() -> Vec<String> {
    [
        "node_modules",
        "__pycache__",
        ".git",
        "venv",
        ".venv",
        "dist",
        "build",
        "target",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

/// Settings loaded from `.docdrift.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Path substrings to exclude from both extraction passes
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Name patterns excluded from undocumented-ness checks
    #[serde(default = "crate::drift::comparator::default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Flag code entities with no docstring and no doc match
    #[serde(default = "default_true")]
    pub require_docstrings: bool,

    /// Compare documented parameter names against code signatures
    #[serde(default = "default_true")]
    pub check_parameters: bool,

    /// Reserved for future return-type checks
    #[serde(default = "default_true")]
    pub check_return_types: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            ignore_patterns: default_ignore_patterns(),
            require_docstrings: true,
            check_parameters: true,
            check_return_types: true,
        }
    }
}

impl DriftConfig {
    /// Load configuration.
    ///
    /// An explicitly-given path must exist; otherwise `.docdrift.toml`
    /// in the working directory is used when present, and defaults
    /// apply when it is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = Path::new(CONFIG_FILE);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// The comparator-facing slice of this configuration
    pub fn comparator_config(&self) -> CompareConfig {
        CompareConfig {
            ignore_patterns: self.ignore_patterns.clone(),
            require_docstrings: self.require_docstrings,
            check_parameters: self.check_parameters,
            check_return_types: self.check_return_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriftConfig::default();
        assert!(config.exclude.is_empty());
        assert!(config.ignore_patterns.contains(&"_*".to_string()));
        assert!(config.require_docstrings);
        assert!(config.check_parameters);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
exclude = ["generated"]
ignore_patterns = ["internal_*"]
require_docstrings = false
"#,
        )
        .unwrap();

        let config = DriftConfig::load(Some(&path)).unwrap();
        assert_eq!(config.exclude, vec!["generated"]);
        assert_eq!(config.ignore_patterns, vec!["internal_*"]);
        assert!(!config.require_docstrings);
        // untouched fields keep their defaults
        assert!(config.check_parameters);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = DriftConfig::load(Some(Path::new("/nonexistent/.docdrift.toml")));
        assert!(err.is_err());
    }

    #[test]
    fn test_config_error_names_the_value() {
        let err = ConfigError::UnknownFormat("yaml".to_string());
        assert!(err.to_string().contains("yaml"));
    }
}
