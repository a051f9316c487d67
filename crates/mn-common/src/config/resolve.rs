//! Configuration resolution.
//!
//! Implements deterministic config resolution order:
//! 1. Explicit path passed by the caller
//! 2. Environment variables (MULTINOM_CONFIG, MULTINOM_CONFIG_DIR)
//! 3. XDG default (~/.config/multinom/)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, ConfigResolution, ConfigSource};
use crate::error::{Error, Result};

/// Environment variable holding a direct path to the config file.
pub const ENV_CONFIG_PATH: &str = "MULTINOM_CONFIG";
/// Environment variable holding a directory containing `multinom.toml`.
pub const ENV_CONFIG_DIR: &str = "MULTINOM_CONFIG_DIR";
/// Standard config file name.
pub const CONFIG_FILENAME: &str = "multinom.toml";

const APP_DIR: &str = "multinom";

/// Explicit configuration locations supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory containing `multinom.toml`
    pub config_dir: Option<PathBuf>,
    /// Explicit path to the config file
    pub config_path: Option<PathBuf>,
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    explicit: ConfigPaths,
}

impl ConfigResolver {
    /// Create a new resolver with explicit paths.
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { explicit: paths }
    }

    /// Create a resolver with no explicit overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver::default()
    }

    /// Resolve the config directory path.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.explicit.config_dir {
            return Some(dir.clone());
        }

        if let Ok(dir) = env::var(ENV_CONFIG_DIR) {
            return Some(PathBuf::from(dir));
        }

        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    /// Resolve the config file path and how it was found.
    pub fn resolve_config_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        // 1. Explicit file
        if let Some(ref path) = self.explicit.config_path {
            return (Some(path.clone()), ConfigResolution::Explicit);
        }

        // 2. MULTINOM_CONFIG env var
        if let Ok(path) = env::var(ENV_CONFIG_PATH) {
            return (Some(PathBuf::from(path)), ConfigResolution::EnvVar);
        }

        // 3. Config dir (explicit, env or XDG); only used when the file exists
        if let Some(config_dir) = self.resolve_config_dir() {
            let path = config_dir.join(CONFIG_FILENAME);
            if path.exists() {
                let resolution = if self.explicit.config_dir.is_some() {
                    ConfigResolution::Explicit
                } else if env::var_os(ENV_CONFIG_DIR).is_some() {
                    ConfigResolution::EnvVar
                } else {
                    ConfigResolution::XdgConfig
                };
                return (Some(path), resolution);
            }
        }

        // 4. Default
        (None, ConfigResolution::Default)
    }

    /// Load the config from the resolved path, or fall back to defaults.
    pub fn load(&self) -> Result<(Config, ConfigSource)> {
        let (path, resolution) = self.resolve_config_path();

        match path {
            Some(p) => {
                let config = load_config_file(&p)?;
                Ok((
                    config,
                    ConfigSource {
                        path: Some(p.to_string_lossy().to_string()),
                        resolution,
                    },
                ))
            }
            None => Ok((
                Config::default(),
                ConfigSource {
                    path: None,
                    resolution: ConfigResolution::Default,
                },
            )),
        }
    }
}

/// Read, parse and validate a single config file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        message: format!("failed to read: {}", e),
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        message: format!("failed to parse: {}", e),
    })?;

    config.validate()?;
    Ok(config)
}
