//! Logging setup shared by the library and the `pit-view` binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. Logs always go to stderr so that stdout stays free for
//! rendered screens.
//!
//! `RUST_LOG` wins over everything else. Without it the level comes from
//! `PITWALL_LOG_LEVEL` (or `--verbose`), the format from `PITWALL_LOG_FORMAT`.
//!
//! ```no_run
//! use libpitwall::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::from_env(false).with_format(LogFormat::Json).init();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const FORMAT_ENV: &str = "PITWALL_LOG_FORMAT";
const LEVEL_ENV: &str = "PITWALL_LOG_LEVEL";
const DEFAULT_LEVEL: &str = "info";
const VERBOSE_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact lines without targets
    #[default]
    Text,
    /// One flattened JSON object per event
    Json,
    /// Multi-line with source locations
    Pretty,
}

const LOG_FORMATS: [(&str, LogFormat); 3] = [
    ("text", LogFormat::Text),
    ("json", LogFormat::Json),
    ("pretty", LogFormat::Pretty),
];

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        LOG_FORMATS
            .iter()
            .find(|(_, format)| format == self)
            .map(|(name, _)| *name)
            .unwrap_or("text")
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LOG_FORMATS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, format)| *format)
            .ok_or_else(|| {
                let names: Vec<&str> = LOG_FORMATS.iter().map(|(name, _)| *name).collect();
                format!("Invalid log format: '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriber settings for a `pit-view` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read `PITWALL_LOG_FORMAT` and `PITWALL_LOG_LEVEL`. An unparseable
    /// format falls back to text.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var(FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let level = std::env::var(LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());

        Self::new(format, level, verbose)
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Level used when `RUST_LOG` is unset; `verbose` forces debug
    pub fn effective_level(&self) -> &str {
        if self.verbose {
            VERBOSE_LEVEL
        } else {
            &self.level
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.effective_level()))
    }

    /// Install the global subscriber. Returns `false` if one was already
    /// installed.
    pub fn init(&self) -> bool {
        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };
        installed.is_ok()
    }
}

/// Install a subscriber configured from the environment only
pub fn init_default() -> bool {
    LoggingConfig::from_env(false).init()
}
