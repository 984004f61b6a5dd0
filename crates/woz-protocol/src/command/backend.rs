//! Commands produced by the backend and sent to a participant.

use serde_json::Value;

use super::message::OutboundMessage;
use super::repr::python_list_repr;
use super::{CommandError, CommandKind, MessageFields, require_sender};
use crate::participant::{Participant, Role};
use crate::registry::ConstantsRegistry;
use crate::scenario::{Scenario, ScenarioError, ScenarioLoader};

/// Task setup sent to the participant playing a role.
///
/// Carries the instructions the scenario defines for that role together with
/// the knowledge-base form description.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    command_name: String,
    role_id: String,
    task_description: String,
    completion_requirements: Vec<String>,
    completion_questions: Vec<String>,
    form_description: Value,
}

impl Setup {
    /// Builds the setup for `role` from a loaded scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::MissingRole`] when the scenario has no
    /// instructions for the role identifier.
    pub fn for_role(
        registry: &ConstantsRegistry,
        scenario: &Scenario,
        role: Role,
    ) -> Result<Self, ScenarioError> {
        let role_id = role.id(registry);
        let instructions = scenario.instructions_for(role_id)?;
        Ok(Self {
            command_name: registry.backend().setup.clone(),
            role_id: role_id.to_owned(),
            task_description: instructions.task_description.clone(),
            completion_requirements: instructions.completion_requirements.clone(),
            completion_questions: instructions.completion_questions.clone(),
            form_description: scenario.form_description.clone(),
        })
    }

    /// Loads the named scenario and builds the setup for `role`.
    ///
    /// # Errors
    ///
    /// Propagates loader failures and [`ScenarioError::MissingRole`].
    pub fn load(
        registry: &ConstantsRegistry,
        loader: &dyn ScenarioLoader,
        scenario: &str,
        role: Role,
    ) -> Result<Self, ScenarioError> {
        let loaded = loader.load(scenario)?;
        Self::for_role(registry, &loaded, role)
    }

    /// Identifier of the participant receiving the setup.
    #[must_use]
    pub const fn role_id(&self) -> &str {
        self.role_id.as_str()
    }

    /// Task instructions shown to the participant.
    #[must_use]
    pub const fn task_description(&self) -> &str {
        self.task_description.as_str()
    }

    /// Serializes to the full setup message.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage {
            task_description: Some(self.task_description.clone()),
            completion_requirements: Some(self.completion_requirements.clone()),
            completion_questions: Some(self.completion_questions.clone()),
            form_description: Some(self.form_description.clone()),
            ..OutboundMessage::command(Some(self.role_id.clone()), self.command_name.as_str())
        }
    }
}

/// Asks a participant to review the finished dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    command_name: String,
    recipient: Option<Participant>,
}

impl Review {
    /// Creates a review request.
    #[must_use]
    pub fn new(registry: &ConstantsRegistry, recipient: Option<Participant>) -> Self {
        Self {
            command_name: registry.backend().review.clone(),
            recipient,
        }
    }

    /// Builds a review request addressed to the message sender.
    #[must_use]
    pub fn from_message(sender: Option<&Participant>, registry: &ConstantsRegistry) -> Self {
        Self::new(registry, sender.cloned())
    }

    /// Participant asked to review, if known.
    #[must_use]
    pub const fn recipient(&self) -> Option<&Participant> {
        self.recipient.as_ref()
    }

    /// Serializes to `{text: "", command}`.
    ///
    /// The recipient is not written; the transport addresses the message.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage::command(None, self.command_name.as_str())
    }
}

/// Reply suggestions offered to the wizard.
///
/// # Example
///
/// ```
/// use woz_protocol::{ConstantsRegistry, Participant, SupplySuggestions};
///
/// let registry = ConstantsRegistry::bundled().expect("bundled table");
/// let command = SupplySuggestions::new(
///     &registry,
///     Participant::new("Wizard"),
///     vec!["Sure, where to?".to_owned()],
/// );
/// assert_eq!(
///     command.message().command.as_deref(),
///     Some("supply_suggestions:['Sure, where to?']"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplySuggestions {
    command_name: String,
    recipient: Participant,
    suggestions: Vec<String>,
}

impl SupplySuggestions {
    /// Creates a suggestion delivery.
    #[must_use]
    pub fn new(
        registry: &ConstantsRegistry,
        recipient: Participant,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            command_name: registry.backend().supply_suggestions.clone(),
            recipient,
            suggestions,
        }
    }

    /// Builds a suggestion delivery addressed to the message sender.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] when the sender or the
    /// `suggestions` field is absent.
    pub fn from_message(
        sender: Option<&Participant>,
        fields: &MessageFields<'_>,
        registry: &ConstantsRegistry,
    ) -> Result<Self, CommandError> {
        let recipient = require_sender(sender, CommandKind::SupplySuggestions)?;
        let suggestions = fields.suggestions().ok_or_else(|| {
            CommandError::missing_field(CommandKind::SupplySuggestions, "suggestions")
        })?;
        Ok(Self::new(registry, recipient, suggestions.to_vec()))
    }

    /// Participant receiving the suggestions.
    #[must_use]
    pub const fn recipient(&self) -> &Participant {
        &self.recipient
    }

    /// Suggestion texts in display order.
    #[must_use]
    pub const fn suggestions(&self) -> &[String] {
        self.suggestions.as_slice()
    }

    /// Serializes to `{id, text: "", command}` with the list appended to the
    /// command token.
    #[must_use]
    pub fn message(&self) -> OutboundMessage {
        let command = format!(
            "{}{}",
            self.command_name,
            python_list_repr(&self.suggestions)
        );
        OutboundMessage::command(Some(self.recipient.id().to_owned()), command)
    }
}
