//! Logging configuration.
//!
//! Read from the environment:
//! - `MULTINOM_LOG`: level for this crate (`trace`..`error`, `off`)
//! - `RUST_LOG`: fallback; the directive for `mn_core` or a bare level is used
//! - `MULTINOM_LOG_FORMAT`: `human` or `jsonl`

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "MULTINOM_LOG";
pub const ENV_LOG_FORMAT: &str = "MULTINOM_LOG_FORMAT";

/// Output format of the stderr log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Minimum level emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    /// Default: the distribution only logs below warn, so nothing is shown
    /// unless asked for.
    #[default]
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        })
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output with timestamps.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Warn,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build from the process environment. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LogConfig::default();

        let level = match lookup(ENV_LOG_LEVEL) {
            Some(val) => val.parse::<LogLevel>().ok(),
            None => lookup("RUST_LOG").and_then(|val| level_from_rust_log(&val)),
        };
        if let Some(level) = level {
            config.level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok()) {
            config.format = format;
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

/// Pick the level that applies to this crate out of a `RUST_LOG` string.
///
/// A `mn_core=<level>` directive wins over a bare global level.
fn level_from_rust_log(spec: &str) -> Option<LogLevel> {
    let mut global = None;
    for directive in spec.split(',').map(str::trim) {
        match directive.split_once('=') {
            Some((target, level)) if target.trim() == "mn_core" => {
                return level.parse().ok();
            }
            Some(_) => {}
            None => global = directive.parse().ok().or(global),
        }
    }
    global
}
