//! Commands only the wizard sends.

use super::message::{OutboundMessage, QueryPayload};
use super::worker::signal_command;
use super::{CommandError, CommandKind, MessageFields, require_sender};
use crate::constraints::{Constraint, ConstraintError, constraints_from_payload};
use crate::participant::Participant;

/// Knowledge-base query issued by the wizard.
///
/// The payload is either the text typed after the query prefix or, when the
/// frontend sends one, the structured `query` list of the inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sender: Participant,
    payload: QueryPayload,
}

impl Query {
    /// Creates a query.
    #[must_use]
    pub const fn new(sender: Participant, payload: QueryPayload) -> Self {
        Self { sender, payload }
    }

    /// Builds a query from a message whose text matched the query prefix.
    ///
    /// A structured `query` field takes precedence over the extracted text.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] when the sender is absent or no
    /// prefix was matched.
    pub fn from_message(
        sender: Option<&Participant>,
        fields: &MessageFields<'_>,
    ) -> Result<Self, CommandError> {
        let participant = require_sender(sender, CommandKind::Query)?;
        let extracted = fields.extracted_from_text().ok_or_else(|| {
            CommandError::missing_field(CommandKind::Query, "extracted_from_text")
        })?;
        let payload = fields.query().map_or_else(
            || QueryPayload::Text(extracted.to_owned()),
            |entries| QueryPayload::Structured(entries.to_vec()),
        );
        Ok(Self::new(participant, payload))
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender(&self) -> &Participant {
        &self.sender
    }

    /// Returns the raw query payload.
    #[must_use]
    pub const fn payload(&self) -> &QueryPayload {
        &self.payload
    }

    /// Parses the payload into field constraints.
    ///
    /// The result is never empty: a query without constraints yields a single
    /// empty constraint that matches every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] when the payload is not a list of
    /// mappings of literal expressions.
    pub fn constraints(&self) -> Result<Vec<Constraint>, ConstraintError> {
        constraints_from_payload(&self.payload)
    }

    /// Serializes to `{id, text: "", query}`.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage {
            query: Some(self.payload.clone()),
            ..OutboundMessage::addressed(self.sender.id(), "")
        }
    }
}

signal_command!(
    /// The wizard selected the primary knowledge-base entry.
    SelectPrimary,
    CommandKind::SelectPrimary
);

signal_command!(
    /// The wizard selected the reference knowledge-base entry.
    SelectSecondary,
    CommandKind::SelectSecondary
);

/// The wizard asked for reply suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSuggestions {
    sender: Participant,
    query_text: String,
}

impl RequestSuggestions {
    /// Creates a suggestion request.
    #[must_use]
    pub fn new(sender: Participant, query_text: impl Into<String>) -> Self {
        Self {
            sender,
            query_text: query_text.into(),
        }
    }

    /// Builds a suggestion request from the full message text.
    ///
    /// The prefix is kept so the suggestion service sees what the wizard
    /// typed; an absent text becomes the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] when the sender is absent.
    pub fn from_message(
        sender: Option<&Participant>,
        fields: &MessageFields<'_>,
    ) -> Result<Self, CommandError> {
        let participant = require_sender(sender, CommandKind::RequestSuggestions)?;
        Ok(Self::new(participant, fields.text().unwrap_or_default()))
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender(&self) -> &Participant {
        &self.sender
    }

    /// Text the suggestions should answer.
    #[must_use]
    pub const fn query_text(&self) -> &str {
        self.query_text.as_str()
    }

    /// Serializes to `{id, text}`.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage::addressed(self.sender.id(), self.query_text.as_str())
    }
}

/// The wizard picked one of the offered suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickSuggestion {
    sender: Participant,
    chosen_text: String,
}

impl PickSuggestion {
    /// Creates a pick.
    #[must_use]
    pub fn new(sender: Participant, chosen_text: impl Into<String>) -> Self {
        Self {
            sender,
            chosen_text: chosen_text.into(),
        }
    }

    /// Builds a pick from the text following the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] when the sender is absent or the
    /// chosen text is absent or empty.
    pub fn from_message(
        sender: Option<&Participant>,
        fields: &MessageFields<'_>,
    ) -> Result<Self, CommandError> {
        let participant = require_sender(sender, CommandKind::PickSuggestion)?;
        let chosen = fields
            .extracted_from_text()
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                CommandError::missing_field(CommandKind::PickSuggestion, "extracted_from_text")
            })?;
        Ok(Self::new(participant, chosen))
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender(&self) -> &Participant {
        &self.sender
    }

    /// The suggestion text the wizard chose.
    #[must_use]
    pub const fn chosen_text(&self) -> &str {
        self.chosen_text.as_str()
    }

    /// Serializes to `{id, text}`.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage::addressed(self.sender.id(), self.chosen_text.as_str())
    }
}
