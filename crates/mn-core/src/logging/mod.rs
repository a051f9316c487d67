//! Structured logging setup.
//!
//! The library only emits `tracing` events; nothing is printed until a
//! subscriber is installed. [`init_logging`] installs one writing to stderr,
//! either as human-readable lines or as JSONL:
//!
//! ```ignore
//! use mn_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env());
//! ```
//!
//! Events emitted by this crate:
//! - `debug`: distribution constructed, argument check failed, statistic undefined
//! - `trace`: every kernel evaluation

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the global subscriber.
///
/// Only the first call does anything. Returns whether a subscriber from this
/// function is active; `false` means another global subscriber was already
/// set elsewhere.
pub fn init_logging(config: &LogConfig) -> bool {
    *INSTALLED.get_or_init(|| install(config))
}

/// [`init_logging`] with [`LogConfig::from_env`].
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env())
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let directive = format!("mn_core={}", config.level);
    if std::env::var_os(config::ENV_LOG_LEVEL).is_some() {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

fn install(config: &LogConfig) -> bool {
    let filter = build_filter(config);

    let result = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .flatten_event(true),
            )
            .try_init(),
    };

    result.is_ok()
}
