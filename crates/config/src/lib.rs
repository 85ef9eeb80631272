//! Configuration loading and validation.
//!
//! Reads `sovereign.toml` (every field optional) and applies environment
//! overrides on top.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use sovereign_core::{EvolutionConfig, ModeBudgets, PackerConfig, RerankerConfig};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sovereign.toml";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovereignConfig {
    /// Directory holding per-domain evolution history
    #[serde(default = "default_meta_dir")]
    pub meta_dir: PathBuf,

    /// Directory holding skill directories
    #[serde(default = "default_skills_dir")]
    pub skills_dir: PathBuf,

    /// Reranker settings
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Packer settings
    #[serde(default)]
    pub packer: PackerConfig,

    /// Per-tier packing budgets
    #[serde(default)]
    pub budgets: ModeBudgets,

    /// Evolution tuning
    #[serde(default)]
    pub evolution: EvolutionConfig,
}

fn default_meta_dir() -> PathBuf {
    PathBuf::from(".sovereign-meta")
}

fn default_skills_dir() -> PathBuf {
    PathBuf::from("skills")
}

impl Default for SovereignConfig {
    fn default() -> Self {
        Self {
            meta_dir: default_meta_dir(),
            skills_dir: default_skills_dir(),
            reranker: RerankerConfig::default(),
            packer: PackerConfig::default(),
            budgets: ModeBudgets::default(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl SovereignConfig {
    /// Load from `path` (or `sovereign.toml`), apply environment overrides
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply `SOVEREIGN_META_DIR`, `SOVEREIGN_SKILLS_DIR` and
    /// `SOVEREIGN_ALPHA` from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SOVEREIGN_META_DIR") {
            self.meta_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("SOVEREIGN_SKILLS_DIR") {
            self.skills_dir = PathBuf::from(dir);
        }

        if let Some(alpha) = lookup("SOVEREIGN_ALPHA") {
            self.reranker.alpha = alpha.trim().parse().map_err(|_| ConfigError::EnvError {
                var: "SOVEREIGN_ALPHA".to_string(),
                value: alpha.clone(),
            })?;
        }

        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.reranker.alpha) {
            return Err(ConfigError::ValidationError(
                "reranker.alpha must be between 0.0 and 1.0".into(),
            ));
        }

        if !(self.packer.tokens_per_char > 0.0) {
            return Err(ConfigError::ValidationError(
                "packer.tokens_per_char must be > 0".into(),
            ));
        }

        if self.evolution.trend_window < 2 || self.evolution.convergence_window < 2 {
            return Err(ConfigError::ValidationError(
                "evolution windows must cover at least 2 cycles".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Config path
        path: PathBuf,
        /// Cause
        reason: String,
    },

    /// The file is not valid TOML for this schema
    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError {
        /// Config path
        path: PathBuf,
        /// Cause
        reason: String,
    },

    /// An environment override could not be parsed
    #[error("Invalid value for {var}: {value:?}")]
    EnvError {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// A value is out of range
    #[error("Config validation error: {0}")]
    ValidationError(String),
}
