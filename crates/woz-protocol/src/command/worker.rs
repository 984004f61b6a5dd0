//! Commands either participant may send.

use super::message::OutboundMessage;
use super::{CommandError, CommandKind, MessageFields, require_sender};
use crate::participant::Participant;

/// Free text typed by a participant.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use woz_protocol::{Participant, Utter};
///
/// let utter = Utter::new(Participant::new("User"), "hello");
/// let message = serde_json::to_value(utter.message()).expect("serialize");
/// assert_eq!(message, json!({"id": "User", "text": "hello"}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utter {
    sender: Participant,
    text: String,
}

impl Utter {
    /// Creates an utterance.
    #[must_use]
    pub fn new(sender: Participant, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    /// Builds an utterance from the message `text` field.
    ///
    /// An empty text is accepted; an absent one is not.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] when the sender or the `text`
    /// field is absent.
    pub fn from_message(
        sender: Option<&Participant>,
        fields: &MessageFields<'_>,
    ) -> Result<Self, CommandError> {
        let participant = require_sender(sender, CommandKind::Utter)?;
        let text = fields
            .text()
            .ok_or_else(|| CommandError::missing_field(CommandKind::Utter, "text"))?;
        Ok(Self::new(participant, text))
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender(&self) -> &Participant {
        &self.sender
    }

    /// Returns the uttered text.
    #[must_use]
    pub const fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Serializes to `{id, text}`.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage::addressed(self.sender.id(), self.text.as_str())
    }
}

macro_rules! signal_command {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            sender: Participant,
        }

        impl $name {
            /// Creates the command for the given sender.
            #[must_use]
            pub const fn new(sender: Participant) -> Self {
                Self { sender }
            }

            /// Builds the command from an inbound message.
            ///
            /// # Errors
            ///
            /// Returns [`CommandError::MissingField`] when the sender is
            /// absent.
            pub fn from_message(sender: Option<&Participant>) -> Result<Self, CommandError> {
                require_sender(sender, $kind).map(Self::new)
            }

            /// Returns the sender.
            #[must_use]
            pub const fn sender(&self) -> &Participant {
                &self.sender
            }

            /// Serializes to `{id, text: ""}`.
            #[must_use]
            pub fn message(&self) -> OutboundMessage {
                OutboundMessage::addressed(self.sender.id(), "")
            }
        }
    };
}

pub(super) use signal_command;

signal_command!(
    /// The participant declared the dialogue complete.
    DialogueCompleted,
    CommandKind::DialogueCompleted
);

signal_command!(
    /// The participant finished the task.
    TaskDone,
    CommandKind::TaskDone
);
