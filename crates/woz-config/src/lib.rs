//! Shared configuration for the woz protocol tools.
//!
//! Settings are resolved from command-line flags first, then from `WOZ_*`
//! environment variables, then from the defaults in [`defaults`]. Loading
//! fails fast on malformed values so the tools never start half-configured.

mod defaults;
mod logging;

use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SCENARIO_DIR, default_log_filter, default_log_format,
    default_scenario_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Environment variable naming the constants table.
pub const CONSTANTS_PATH_ENV: &str = "WOZ_CONSTANTS_PATH";
/// Environment variable naming the scenario directory.
pub const SCENARIO_DIR_ENV: &str = "WOZ_SCENARIO_DIR";
/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV: &str = "WOZ_LOG_FILTER";
/// Environment variable holding the log format.
pub const LOG_FORMAT_ENV: &str = "WOZ_LOG_FORMAT";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Flags or environment values could not be parsed.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// The log filter was blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,

    /// A configured path was blank.
    #[error("{setting} must not be an empty path")]
    EmptyPath {
        /// Flag name of the offending setting.
        setting: &'static str,
    },
}

/// Runtime configuration shared by the woz tools.
#[derive(Debug, Clone, PartialEq, Eq, Parser, Serialize, Deserialize)]
#[command(version, about = "Wizard-of-Oz dialogue protocol tools")]
pub struct Config {
    /// JSON constants table; the bundled table is used when unset.
    #[arg(long, env = CONSTANTS_PATH_ENV, value_name = "PATH")]
    #[serde(default)]
    constants_path: Option<Utf8PathBuf>,

    /// Directory holding `<name>.json` scenario files.
    #[arg(long, env = SCENARIO_DIR_ENV, value_name = "DIR", default_value = DEFAULT_SCENARIO_DIR)]
    #[serde(default = "default_scenario_dir")]
    scenario_dir: Utf8PathBuf,

    /// Tracing filter directive, for example `info` or `woz_protocol=debug`.
    #[arg(long, env = LOG_FILTER_ENV, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    #[serde(default = "owned_default_log_filter")]
    log_filter: String,

    /// Log output format: `json` or `compact`.
    #[arg(long, env = LOG_FORMAT_ENV, value_name = "FORMAT", default_value_t = default_log_format())]
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
}

fn owned_default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            constants_path: None,
            scenario_dir: default_scenario_dir(),
            log_filter: owned_default_log_filter(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a flag or environment value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with [`std::env::args_os`].
    /// Environment variables still supply values for flags that are absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a flag or environment value is invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        if self.scenario_dir.as_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                setting: "--scenario-dir",
            });
        }
        if self
            .constants_path
            .as_ref()
            .is_some_and(|path| path.as_str().is_empty())
        {
            return Err(ConfigError::EmptyPath {
                setting: "--constants-path",
            });
        }
        Ok(())
    }

    /// Constants table to load instead of the bundled one.
    #[must_use]
    pub fn constants_path(&self) -> Option<&Utf8Path> {
        self.constants_path.as_deref()
    }

    /// Directory holding scenario files.
    #[must_use]
    pub fn scenario_dir(&self) -> &Utf8Path {
        &self.scenario_dir
    }

    /// Tracing filter directive.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests;
