//! Default configuration values.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the tools.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Directory searched for scenario files when none is configured.
pub const DEFAULT_SCENARIO_DIR: &str = "scenarios";

/// Default log filter expression used by the tools.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the tools.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default scenario directory, relative to the working directory.
#[must_use]
pub fn default_scenario_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SCENARIO_DIR)
}
