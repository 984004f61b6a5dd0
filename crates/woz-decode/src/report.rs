//! JSONL envelopes read from standard input and the reports written back.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use woz_protocol::{
    Command, CommandError, Constraint, ConstraintError, Decoder, InboundMessage, OutboundMessage,
    Participant, Role, ScenarioError, ScenarioLoader, Setup,
};

/// Tracing target for per-line decoding.
const REPORT_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::report");

/// Why a single input line produced no command.
#[derive(Debug, Error)]
pub enum LineError {
    /// The line is not a valid envelope.
    #[error("invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    /// The envelope carries both a message and a setup request.
    #[error("envelope must carry either a message or a setup request, not both")]
    Ambiguous,

    /// The protocol decoder rejected the message.
    #[error(transparent)]
    Decode(#[from] CommandError),

    /// The query decoded but its constraints did not parse.
    #[error(transparent)]
    Constraints(#[from] ConstraintError),

    /// The setup scenario could not be loaded.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// One input line: a message to decode or a setup to build.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    message: Option<InboundMessage>,
    #[serde(default)]
    setup: Option<SetupRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetupRequest {
    scenario: String,
    role: Role,
}

/// Result written for one input line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outbound: Option<OutboundMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<Vec<Constraint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Report {
    fn empty(line: usize) -> Self {
        Self {
            line,
            kind: None,
            outbound: None,
            constraints: None,
            error: None,
        }
    }

    fn command(line: usize, command: &Command) -> Result<Self, LineError> {
        let constraints = match command {
            Command::Query(query) => Some(query.constraints()?),
            _ => None,
        };
        Ok(Self {
            kind: Some(command.kind().as_str()),
            outbound: Some(command.message()),
            constraints,
            ..Self::empty(line)
        })
    }

    fn setup(line: usize, setup: &Setup) -> Self {
        Self {
            kind: Some("setup"),
            outbound: Some(setup.message()),
            ..Self::empty(line)
        }
    }

    fn failure(line: usize, error: &LineError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(line)
        }
    }

    /// One-based input line the report describes.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Whether the line failed to decode.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Decodes envelopes against a shared decoder and scenario loader.
pub struct LineDecoder<'a> {
    decoder: &'a Decoder,
    scenarios: &'a dyn ScenarioLoader,
}

impl<'a> LineDecoder<'a> {
    /// Creates a line decoder.
    #[must_use]
    pub const fn new(decoder: &'a Decoder, scenarios: &'a dyn ScenarioLoader) -> Self {
        Self { decoder, scenarios }
    }

    /// Decodes one line into a report; failures become error reports.
    #[must_use]
    pub fn report(&self, line: usize, text: &str) -> Report {
        match self.decode(line, text) {
            Ok(report) => {
                debug!(target: REPORT_TARGET, line, kind = report.kind, "line decoded");
                report
            }
            Err(error) => {
                warn!(target: REPORT_TARGET, line, %error, "line rejected");
                Report::failure(line, &error)
            }
        }
    }

    fn decode(&self, line: usize, text: &str) -> Result<Report, LineError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match (envelope.setup, envelope.message) {
            (Some(_), Some(_)) => Err(LineError::Ambiguous),
            (Some(request), None) => {
                let setup = Setup::load(
                    self.decoder.registry(),
                    self.scenarios,
                    &request.scenario,
                    request.role,
                )?;
                Ok(Report::setup(line, &setup))
            }
            (None, message) => {
                let sender = envelope.sender.map(Participant::new);
                match self.decoder.decode(message.as_ref(), sender.as_ref())? {
                    Some(command) => Report::command(line, &command),
                    None => Ok(Report::empty(line)),
                }
            }
        }
    }
}
