//! Logging configuration from the environment and CLI flags.
//!
//! `VT_LOG` (falling back to `RUST_LOG`) holds either a bare level or a full
//! `EnvFilter` directive over event-name targets, e.g.
//! `warn,session.advanced=trace`. `VT_LOG_FORMAT` picks the line format.
//! `-v`/`-q` and `--log-format` override both.

use std::str::FromStr;

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable carrying a level or filter directive.
pub const ENV_LOG: &str = "VT_LOG";
/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "VT_LOG_FORMAT";

/// Line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// `tracing_subscriber::fmt` lines.
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

/// Level implied by `-v` / `-q`, or `None` to leave the environment in charge.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (true, _) => Some(LevelFilter::ERROR),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::DEBUG),
        (false, _) => Some(LevelFilter::TRACE),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
    /// Directive from the environment that is more than a bare level.
    pub directive: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            directive: None,
        }
    }
}

impl LogConfig {
    /// Read `VT_LOG` / `RUST_LOG` / `VT_LOG_FORMAT`, then apply CLI overrides.
    pub fn from_env(cli_level: Option<LevelFilter>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|k| std::env::var(k).ok(), cli_level, cli_format)
    }

    fn from_lookup(
        env: impl Fn(&str) -> Option<String>,
        cli_level: Option<LevelFilter>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let mut config = LogConfig::default();

        if let Some(raw) = env(ENV_LOG).or_else(|| env("RUST_LOG")) {
            match LevelFilter::from_str(raw.trim()) {
                Ok(level) => config.level = level,
                Err(_) => config.directive = Some(raw),
            }
        }
        if let Some(format) = env(ENV_LOG_FORMAT).and_then(|v| LogFormat::from_str(&v, true).ok()) {
            config.format = format;
        }

        if let Some(level) = cli_level {
            config.level = level;
            config.directive = None;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }
        config
    }

    /// Filter directive handed to `EnvFilter`.
    pub fn filter_directive(&self) -> String {
        match &self.directive {
            Some(directive) => directive.clone(),
            None => self.level.to_string().to_lowercase(),
        }
    }
}
