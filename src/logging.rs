//! Logging setup for hosts that do not install their own subscriber
//!
//! The store emits `tracing` events (statement SQL at `debug`, connection
//! lifecycle at `info`; bound values are never logged). Rust hosts usually
//! bring their own subscriber; the Node binding calls [`LoggingConfig::init`].

use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or `sqlite_records=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT` (`pretty` or `compact`)
    pub fn from_env() -> Self {
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Build the filter: `RUST_LOG` wins over the configured level
    pub fn env_filter(&self) -> EnvFilter {
        build_filter(env::var("RUST_LOG").ok().as_deref(), &self.level)
    }

    /// Install the global subscriber
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn init(&self) -> bool {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let installed = match self.format {
            LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        };
        installed.is_ok()
    }
}

/// First directive that parses wins: `env_directive`, then `level`, then `info`
fn build_filter(env_directive: Option<&str>, level: &str) -> EnvFilter {
    env_directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the default subscriber, see [`LoggingConfig::from_env`]
pub fn init_from_env() -> bool {
    LoggingConfig::from_env().init()
}
