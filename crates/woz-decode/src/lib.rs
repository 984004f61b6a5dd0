//! Command-line decoder for Wizard-of-Oz protocol messages.
//!
//! Each line of input is a JSON envelope:
//!
//! - `{"sender": "Wizard", "message": {"text": "[DONE]"}}` decodes a
//!   frontend message. Either field may be `null` or omitted.
//! - `{"setup": {"scenario": "taxi", "role": "wizard"}}` builds the setup
//!   command for a role from the configured scenario directory.
//!
//! Every non-blank line produces one JSON report on standard output carrying
//! its one-based `line` number plus either `kind` and `outbound` (and
//! `constraints` for queries) or `error`. An absent message yields a report
//! with neither. Logs go to standard error.
//!
//! Exit status is 0 when every line decoded, 1 when any line failed or
//! output could not be written, and 2 when configuration or startup failed.

mod report;
pub mod telemetry;

use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use thiserror::Error;
use tracing::info;
use woz_config::{Config, ConfigError};
use woz_protocol::{
    ConstantsRegistry, Decoder, DirectoryScenarioLoader, RegistryError, RegistrySource,
    ScenarioLoader,
};

pub use report::{LineDecoder, LineError, Report};
pub use telemetry::TelemetryError;

/// Tracing target for the tool's lifecycle events.
const RUN_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::run");

/// Exit status for configuration and startup failures.
const STARTUP_FAILURE: u8 = 2;

/// Failures that stop the tool before any line is read.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The constants table could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Counts of decoded and rejected lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Lines that produced a command or an idle report.
    pub decoded: usize,
    /// Lines that produced an error report.
    pub failed: usize,
}

impl Summary {
    /// Exit status for the run.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        if self.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Runs the tool with the given arguments and streams.
#[must_use]
pub fn run<I, R, W, E>(args: I, input: R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let config = match Config::load_from_iter(args) {
        Ok(config) => config,
        Err(ConfigError::Cli(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            return match write!(stdout, "{}", error.render()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report_startup_failure(stderr, &StartupError::from(error)),
    };

    let decoder = match prepare(&config) {
        Ok(decoder) => decoder,
        Err(error) => return report_startup_failure(stderr, &error),
    };
    let scenarios = DirectoryScenarioLoader::new(config.scenario_dir().as_std_path());

    match process(&decoder, &scenarios, input, stdout) {
        Ok(summary) => {
            info!(
                target: RUN_TARGET,
                decoded = summary.decoded,
                failed = summary.failed,
                "input exhausted"
            );
            summary.exit_code()
        }
        Err(error) => {
            let _ = writeln!(stderr, "failed to stream reports: {error}");
            ExitCode::FAILURE
        }
    }
}

fn prepare(config: &Config) -> Result<Decoder, StartupError> {
    telemetry::initialise(config)?;
    let registry = load_registry(config)?;
    Ok(Decoder::new(registry)?)
}

fn load_registry(config: &Config) -> Result<Arc<ConstantsRegistry>, RegistryError> {
    let source = config
        .constants_path()
        .map_or_else(RegistrySource::bundled, |path| {
            RegistrySource::from_path(path.as_std_path())
        });
    source.load()
}

fn report_startup_failure<E: Write>(stderr: &mut E, error: &StartupError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    ExitCode::from(STARTUP_FAILURE)
}

/// Decodes every non-blank line of `input` and writes one report per line.
///
/// # Errors
///
/// Returns an I/O error when input cannot be read or a report cannot be
/// written. Malformed lines are reported, not returned.
pub fn process<R, W>(
    decoder: &Decoder,
    scenarios: &dyn ScenarioLoader,
    input: R,
    output: &mut W,
) -> io::Result<Summary>
where
    R: BufRead,
    W: Write,
{
    let lines = LineDecoder::new(decoder, scenarios);
    let mut summary = Summary::default();
    for (index, line) in input.lines().enumerate() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        let report = lines.report(index.saturating_add(1), &text);
        if report.is_failure() {
            summary.failed = summary.failed.saturating_add(1);
        } else {
            summary.decoded = summary.decoded.saturating_add(1);
        }
        serde_json::to_writer(&mut *output, &report)?;
        output.write_all(b"\n")?;
    }
    output.flush()?;
    Ok(summary)
}
