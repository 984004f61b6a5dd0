//! Errors raised while constructing commands.

use thiserror::Error;

use super::CommandKind;

/// Errors surfaced when a command cannot be built from its fields.
///
/// These are per-message failures: a malformed inbound message produces the
/// same error every time and never affects other messages.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A field the command requires is absent or empty.
    #[error("{command} command requires field '{field}'")]
    MissingField {
        /// Command that was being built.
        command: CommandKind,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The command is produced by the backend and cannot come from a message.
    #[error("{command} command cannot be created from an inbound message")]
    UnsupportedConstruction {
        /// Command that was requested.
        command: CommandKind,
    },
}

impl CommandError {
    /// Creates a missing field error.
    #[must_use]
    pub const fn missing_field(command: CommandKind, field: &'static str) -> Self {
        Self::MissingField { command, field }
    }

    /// Creates an unsupported construction error.
    #[must_use]
    pub const fn unsupported(command: CommandKind) -> Self {
        Self::UnsupportedConstruction { command }
    }
}
