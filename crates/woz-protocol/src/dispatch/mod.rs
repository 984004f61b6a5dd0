//! Routing of decoded commands to session logic.
//!
//! The [`Dispatcher`] decodes each inbound message and forwards the command
//! to a [`SessionHandler`] according to its origin. Backend commands are
//! produced by the session, never received, so decoding one means the
//! frontend and backend disagree about the protocol.

use thiserror::Error;
use tracing::{debug, warn};

use crate::command::{Command, CommandError, CommandKind, InboundMessage, Origin};
use crate::decoder::Decoder;
use crate::participant::Participant;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::dispatch");

/// Failure reported by a session handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Errors surfaced while dispatching a message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message could not be decoded.
    #[error("failed to decode message: {0}")]
    Decode(#[from] CommandError),

    /// A backend command arrived from the frontend.
    #[error("backend command '{kind}' cannot be dispatched to a session")]
    UnexpectedBackendCommand {
        /// Command that was decoded.
        kind: CommandKind,
    },

    /// The session handler rejected the command.
    #[error("session handler failed: {0}")]
    Handler(#[from] HandlerError),
}

/// Session logic receiving decoded commands.
pub trait SessionHandler {
    /// Handles `Utter`, `DialogueCompleted`, and `TaskDone`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the session cannot apply the command.
    fn on_worker_command(&mut self, command: &Command) -> Result<(), HandlerError>;

    /// Handles commands only the wizard sends.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the session cannot apply the command.
    fn on_wizard_command(&mut self, command: &Command) -> Result<(), HandlerError>;
}

/// Outcome of dispatching one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// There was no message to dispatch.
    Idle,
    /// The command was handed to the session.
    Routed(Command),
}

/// Decodes inbound messages and routes the commands to a session handler.
#[derive(Debug)]
pub struct Dispatcher<H> {
    decoder: Decoder,
    handler: H,
}

impl<H: SessionHandler> Dispatcher<H> {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(decoder: Decoder, handler: H) -> Self {
        Self { decoder, handler }
    }

    /// Returns the decoder.
    #[must_use]
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Returns the session handler.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Consumes the dispatcher and returns the session handler.
    #[must_use]
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Decodes `message` and routes the command by origin.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Decode`] for undecodable messages,
    /// [`DispatchError::UnexpectedBackendCommand`] for backend commands, and
    /// [`DispatchError::Handler`] when the handler fails.
    pub fn dispatch(
        &mut self,
        message: Option<&InboundMessage>,
        sender: Option<&Participant>,
    ) -> Result<Dispatched, DispatchError> {
        let Some(command) = self.decoder.decode(message, sender)? else {
            return Ok(Dispatched::Idle);
        };
        debug!(
            target: DISPATCH_TARGET,
            command = %command.kind(),
            origin = ?command.origin(),
            "routing command"
        );
        match command.origin() {
            Origin::Worker => self.handler.on_worker_command(&command)?,
            Origin::Wizard => self.handler.on_wizard_command(&command)?,
            Origin::Backend => {
                warn!(
                    target: DISPATCH_TARGET,
                    command = %command.kind(),
                    "backend command received from frontend"
                );
                return Err(DispatchError::UnexpectedBackendCommand {
                    kind: command.kind(),
                });
            }
        }
        Ok(Dispatched::Routed(command))
    }
}
