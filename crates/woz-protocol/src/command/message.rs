//! Wire shapes for inbound and outbound protocol messages.
//!
//! Inbound messages arrive from the chat frontend as JSON objects with at
//! least a `text` field. Outbound messages are JSON objects whose keys depend
//! on the command; absent keys are omitted rather than serialized as `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::ConstantsRegistry;

/// A structured knowledge-base query entry mapping field names to literal
/// expressions.
pub type QueryEntry = Map<String, Value>;

/// Message received from a frontend participant.
///
/// # Example
///
/// ```
/// use woz_protocol::InboundMessage;
///
/// let message: InboundMessage =
///     serde_json::from_str(r#"{"text": "hello", "episode_done": false}"#).expect("parse");
/// assert_eq!(message.text.as_deref(), Some("hello"));
/// assert!(message.extra.contains_key("episode_done"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Typed text, possibly starting with a command prefix.
    #[serde(default)]
    pub text: Option<String>,
    /// Suggestion texts attached by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// Structured knowledge-base query sent by newer wizard frontends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Vec<QueryEntry>>,
    /// Role-specific fields the protocol does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InboundMessage {
    /// Creates a message carrying only text.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attaches a structured query.
    #[must_use]
    pub fn with_query(mut self, query: Vec<QueryEntry>) -> Self {
        self.query = Some(query);
        self
    }

    /// Attaches suggestion texts.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }
}

/// Payload of a knowledge-base query.
///
/// Serialized untagged: text stays a JSON string and a structured query stays
/// a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryPayload {
    /// List of single-field mappings from field name to literal expression.
    Structured(Vec<QueryEntry>),
    /// Raw query text extracted after the query prefix.
    Text(String),
}

/// Message sent to a frontend participant.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use woz_protocol::OutboundMessage;
///
/// let message = OutboundMessage::addressed("Wizard", "hello");
/// let value = serde_json::to_value(&message).expect("serialize");
/// assert_eq!(value, json!({"id": "Wizard", "text": "hello"}));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Sender or recipient identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Displayed text; empty for pure commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Backend command token, possibly with an encoded payload appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Task instructions shown to the worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    /// Conditions the worker must meet before finishing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_requirements: Option<Vec<String>>,
    /// Questions asked when the task is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_questions: Option<Vec<String>>,
    /// Description of the knowledge-base search form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_description: Option<Value>,
    /// Knowledge-base query issued by the wizard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryPayload>,
    /// Knowledge-base item delivered to a participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_item: Option<Value>,
}

impl OutboundMessage {
    /// Creates an `{id, text}` message.
    #[must_use]
    pub fn addressed(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates a message carrying a backend command token and empty text.
    #[must_use]
    pub fn command(id: Option<String>, command: impl Into<String>) -> Self {
        Self {
            id,
            text: Some(String::new()),
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Creates a notice sent on behalf of the backend system.
    #[must_use]
    pub fn system(registry: &ConstantsRegistry, text: impl Into<String>) -> Self {
        Self::addressed(registry.agents().system.as_str(), text)
    }

    /// Creates a knowledge-base delivery message.
    #[must_use]
    pub fn knowledge_base(registry: &ConstantsRegistry, kb_item: Value) -> Self {
        Self {
            id: Some(registry.agents().knowledge_base.clone()),
            kb_item: Some(kb_item),
            ..Self::default()
        }
    }
}
