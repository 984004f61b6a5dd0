//! Typed protocol commands.
//!
//! Every message exchanged between the backend and the frontend corresponds
//! to one [`Command`] variant. Variants fall into three origins:
//!
//! - **backend**: [`Setup`], [`Review`], [`SupplySuggestions`]; sent to a
//!   participant and carry no sender;
//! - **worker**: [`Utter`], [`DialogueCompleted`], [`TaskDone`]; sent by
//!   either participant;
//! - **wizard**: [`Query`], [`SelectPrimary`], [`SelectSecondary`],
//!   [`RequestSuggestions`], [`PickSuggestion`]; sent by the wizard only.
//!
//! Payload structs validate their fields when constructed, so a built command
//! can always produce its [`OutboundMessage`].

mod backend;
mod errors;
mod message;
mod repr;
mod wizard;
mod worker;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::Participant;
use crate::registry::ConstantsRegistry;

pub use self::backend::{Review, Setup, SupplySuggestions};
pub use self::errors::CommandError;
pub use self::message::{InboundMessage, OutboundMessage, QueryEntry, QueryPayload};
pub use self::wizard::{PickSuggestion, Query, RequestSuggestions, SelectPrimary, SelectSecondary};
pub use self::worker::{DialogueCompleted, TaskDone, Utter};

/// Where a command originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Produced by the backend; carries no sender.
    Backend,
    /// Sent by either participant.
    Worker,
    /// Sent by the wizard; a specialisation of [`Origin::Worker`].
    Wizard,
}

impl Origin {
    /// Returns `true` for commands sent by a participant.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Worker | Self::Wizard)
    }
}

/// Discriminant of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Task setup sent to a participant.
    Setup,
    /// Request to review the finished dialogue.
    Review,
    /// Reply suggestions offered to the wizard.
    SupplySuggestions,
    /// Free text typed by a participant.
    Utter,
    /// The participant declared the dialogue complete.
    DialogueCompleted,
    /// The participant finished the task.
    TaskDone,
    /// Knowledge-base query issued by the wizard.
    Query,
    /// The wizard selected the primary knowledge-base entry.
    SelectPrimary,
    /// The wizard selected the reference knowledge-base entry.
    SelectSecondary,
    /// The wizard asked for reply suggestions.
    RequestSuggestions,
    /// The wizard picked one of the offered suggestions.
    PickSuggestion,
}

/// Builds a command from an inbound message.
pub type Constructor =
    fn(Option<&Participant>, &MessageFields<'_>, &ConstantsRegistry) -> Result<Command, CommandError>;

impl CommandKind {
    /// Every command kind in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Setup,
        Self::Review,
        Self::SupplySuggestions,
        Self::Utter,
        Self::DialogueCompleted,
        Self::TaskDone,
        Self::Query,
        Self::SelectPrimary,
        Self::SelectSecondary,
        Self::RequestSuggestions,
        Self::PickSuggestion,
    ];

    /// Returns the canonical snake case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Review => "review",
            Self::SupplySuggestions => "supply_suggestions",
            Self::Utter => "utter",
            Self::DialogueCompleted => "dialogue_completed",
            Self::TaskDone => "task_done",
            Self::Query => "query",
            Self::SelectPrimary => "select_primary",
            Self::SelectSecondary => "select_secondary",
            Self::RequestSuggestions => "request_suggestions",
            Self::PickSuggestion => "pick_suggestion",
        }
    }

    /// Returns the origin of commands of this kind.
    #[must_use]
    pub const fn origin(self) -> Origin {
        match self {
            Self::Setup | Self::Review | Self::SupplySuggestions => Origin::Backend,
            Self::Utter | Self::DialogueCompleted | Self::TaskDone => Origin::Worker,
            Self::Query
            | Self::SelectPrimary
            | Self::SelectSecondary
            | Self::RequestSuggestions
            | Self::PickSuggestion => Origin::Wizard,
        }
    }

    /// Returns the constructor used when decoding a message of this kind.
    #[must_use]
    pub fn constructor(self) -> Constructor {
        match self {
            Self::Setup => build_setup,
            Self::Review => build_review,
            Self::SupplySuggestions => build_supply_suggestions,
            Self::Utter => build_utter,
            Self::DialogueCompleted => build_dialogue_completed,
            Self::TaskDone => build_task_done,
            Self::Query => build_query,
            Self::SelectPrimary => build_select_primary,
            Self::SelectSecondary => build_select_secondary,
            Self::RequestSuggestions => build_request_suggestions,
            Self::PickSuggestion => build_pick_suggestion,
        }
    }
}

fn build_setup(
    _sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    Err(CommandError::unsupported(CommandKind::Setup))
}

fn build_review(
    sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    Ok(Command::Review(Review::from_message(sender, registry)))
}

fn build_supply_suggestions(
    sender: Option<&Participant>,
    fields: &MessageFields<'_>,
    registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    SupplySuggestions::from_message(sender, fields, registry).map(Command::SupplySuggestions)
}

fn build_utter(
    sender: Option<&Participant>,
    fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    Utter::from_message(sender, fields).map(Command::Utter)
}

fn build_dialogue_completed(
    sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    DialogueCompleted::from_message(sender).map(Command::DialogueCompleted)
}

fn build_task_done(
    sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    TaskDone::from_message(sender).map(Command::TaskDone)
}

fn build_query(
    sender: Option<&Participant>,
    fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    Query::from_message(sender, fields).map(Command::Query)
}

fn build_select_primary(
    sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    SelectPrimary::from_message(sender).map(Command::SelectPrimary)
}

fn build_select_secondary(
    sender: Option<&Participant>,
    _fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    SelectSecondary::from_message(sender).map(Command::SelectSecondary)
}

fn build_request_suggestions(
    sender: Option<&Participant>,
    fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    RequestSuggestions::from_message(sender, fields).map(Command::RequestSuggestions)
}

fn build_pick_suggestion(
    sender: Option<&Participant>,
    fields: &MessageFields<'_>,
    _registry: &ConstantsRegistry,
) -> Result<Command, CommandError> {
    PickSuggestion::from_message(sender, fields).map(Command::PickSuggestion)
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields available to a command constructor.
///
/// Combines the inbound message with the payload the decoder extracted from
/// behind a matched prefix.
#[derive(Debug, Clone, Copy)]
pub struct MessageFields<'a> {
    message: &'a InboundMessage,
    extracted_from_text: Option<&'a str>,
}

impl<'a> MessageFields<'a> {
    /// Wraps a message and the text extracted after its prefix.
    #[must_use]
    pub const fn new(message: &'a InboundMessage, extracted_from_text: Option<&'a str>) -> Self {
        Self {
            message,
            extracted_from_text,
        }
    }

    /// Unstripped `text` field, if present.
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        self.message.text.as_deref()
    }

    /// Text following the matched prefix, if a prefix matched.
    #[must_use]
    pub const fn extracted_from_text(&self) -> Option<&'a str> {
        self.extracted_from_text
    }

    /// Suggestion texts, if present.
    #[must_use]
    pub fn suggestions(&self) -> Option<&'a [String]> {
        self.message.suggestions.as_deref()
    }

    /// Structured query entries, if present.
    #[must_use]
    pub fn query(&self) -> Option<&'a [QueryEntry]> {
        self.message.query.as_deref()
    }

    /// The full inbound message.
    #[must_use]
    pub const fn message(&self) -> &'a InboundMessage {
        self.message
    }
}

/// A protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Task setup sent to a participant.
    Setup(Setup),
    /// Request to review the finished dialogue.
    Review(Review),
    /// Reply suggestions offered to the wizard.
    SupplySuggestions(SupplySuggestions),
    /// Free text typed by a participant.
    Utter(Utter),
    /// The participant declared the dialogue complete.
    DialogueCompleted(DialogueCompleted),
    /// The participant finished the task.
    TaskDone(TaskDone),
    /// Knowledge-base query issued by the wizard.
    Query(Query),
    /// The wizard selected the primary knowledge-base entry.
    SelectPrimary(SelectPrimary),
    /// The wizard selected the reference knowledge-base entry.
    SelectSecondary(SelectSecondary),
    /// The wizard asked for reply suggestions.
    RequestSuggestions(RequestSuggestions),
    /// The wizard picked one of the offered suggestions.
    PickSuggestion(PickSuggestion),
}

impl Command {
    /// Returns the command discriminant.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Setup(_) => CommandKind::Setup,
            Self::Review(_) => CommandKind::Review,
            Self::SupplySuggestions(_) => CommandKind::SupplySuggestions,
            Self::Utter(_) => CommandKind::Utter,
            Self::DialogueCompleted(_) => CommandKind::DialogueCompleted,
            Self::TaskDone(_) => CommandKind::TaskDone,
            Self::Query(_) => CommandKind::Query,
            Self::SelectPrimary(_) => CommandKind::SelectPrimary,
            Self::SelectSecondary(_) => CommandKind::SelectSecondary,
            Self::RequestSuggestions(_) => CommandKind::RequestSuggestions,
            Self::PickSuggestion(_) => CommandKind::PickSuggestion,
        }
    }

    /// Returns where the command originates.
    #[must_use]
    pub const fn origin(&self) -> Origin {
        self.kind().origin()
    }

    /// Returns the sending participant; `None` for backend commands.
    #[must_use]
    pub const fn sender(&self) -> Option<&Participant> {
        match self {
            Self::Setup(_) | Self::Review(_) | Self::SupplySuggestions(_) => None,
            Self::Utter(command) => Some(command.sender()),
            Self::DialogueCompleted(command) => Some(command.sender()),
            Self::TaskDone(command) => Some(command.sender()),
            Self::Query(command) => Some(command.sender()),
            Self::SelectPrimary(command) => Some(command.sender()),
            Self::SelectSecondary(command) => Some(command.sender()),
            Self::RequestSuggestions(command) => Some(command.sender()),
            Self::PickSuggestion(command) => Some(command.sender()),
        }
    }

    /// Serializes the command into its outbound message.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        match self {
            Self::Setup(command) => command.message(),
            Self::Review(command) => command.message(),
            Self::SupplySuggestions(command) => command.message(),
            Self::Utter(command) => command.message(),
            Self::DialogueCompleted(command) => command.message(),
            Self::TaskDone(command) => command.message(),
            Self::Query(command) => command.message(),
            Self::SelectPrimary(command) => command.message(),
            Self::SelectSecondary(command) => command.message(),
            Self::RequestSuggestions(command) => command.message(),
            Self::PickSuggestion(command) => command.message(),
        }
    }
}

/// Returns the sender or a missing field error for `command`.
pub(crate) fn require_sender(
    sender: Option<&Participant>,
    command: CommandKind,
) -> Result<Participant, CommandError> {
    sender
        .cloned()
        .ok_or_else(|| CommandError::missing_field(command, "sender"))
}
