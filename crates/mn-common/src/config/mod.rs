//! Configuration loading and validation.
//!
//! This module provides:
//! - Typed evaluation options (`DistributionOptions`)
//! - Deterministic config resolution (explicit path > env > XDG > defaults)
//! - Semantic validation of loaded values

pub mod options;
pub mod resolve;

pub use options::DistributionOptions;
pub use resolve::{ConfigPaths, ConfigResolver};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Contents of a `multinom.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Defaults applied to every distribution built from this config.
    pub distribution: DistributionOptions,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration semantically.
    pub fn validate(&self) -> Result<()> {
        self.distribution.validate()
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Path to the config file, or None if using defaults
    pub path: Option<String>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

/// How a config file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResolution {
    /// Passed explicitly by the caller
    Explicit,
    /// From environment variable
    EnvVar,
    /// From XDG config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::Explicit => write!(f, "explicit"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}

