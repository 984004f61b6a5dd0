//! Message protocol for Wizard-of-Oz dialogue sessions.
//!
//! A wizard operator and a user converse through a chat frontend while a
//! backend supplies setup instructions, knowledge-base lookups, and scripted
//! replies. Everything the two sides exchange is a JSON message whose `text`
//! field may start with a magic prefix token. This crate turns those raw
//! messages into typed [`Command`] values and back again.
//!
//! # Architecture
//!
//! - [`ConstantsRegistry`] holds the protocol tokens (command names, prefix
//!   strings, participant identifiers). It is loaded once through a
//!   [`RegistrySource`] and shared by reference.
//! - [`Command`] is the closed set of protocol commands. Each variant owns a
//!   payload struct that validates its fields on construction and serializes
//!   to an [`OutboundMessage`].
//! - [`Decoder`] matches inbound text against the [`PrefixTable`] and builds
//!   the matching command.
//! - [`Constraint`] values are parsed from knowledge-base queries by a
//!   restricted literal parser; no query text is ever executed.
//! - [`Dispatcher`] decodes a message and routes the command to a
//!   [`SessionHandler`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use woz_protocol::{Command, ConstantsRegistry, Decoder, InboundMessage, Participant};
//!
//! let registry = Arc::new(ConstantsRegistry::bundled().expect("bundled table is valid"));
//! let decoder = Decoder::new(registry).expect("prefix table builds");
//! let wizard = Participant::new("Wizard");
//! let message = InboundMessage::with_text("[DONE] finished early");
//!
//! let command = decoder
//!     .decode(Some(&message), Some(&wizard))
//!     .expect("decodes")
//!     .expect("message was present");
//! assert!(matches!(command, Command::TaskDone(_)));
//! ```

pub mod command;
pub mod constraints;
pub mod decoder;
pub mod dispatch;
pub mod participant;
pub mod registry;
pub mod scenario;
pub mod templates;

#[cfg(test)]
mod tests;

pub use self::command::{
    Command, CommandError, CommandKind, DialogueCompleted, InboundMessage, MessageFields, Origin,
    OutboundMessage, PickSuggestion, Query, QueryPayload, RequestSuggestions, Review,
    SelectPrimary, SelectSecondary, Setup, SupplySuggestions, TaskDone, Utter,
};
pub use self::constraints::{Constraint, ConstraintError, LiteralError, parse_literal};
pub use self::decoder::{Decoder, PrefixEntry, PrefixTable};
pub use self::dispatch::{DispatchError, Dispatched, Dispatcher, HandlerError, SessionHandler};
pub use self::participant::{Participant, Role};
pub use self::registry::{AgentIds, BackendTokens, ConstantsRegistry, RegistryError, RegistrySource};
pub use self::scenario::{
    DirectoryScenarioLoader, RoleInstructions, Scenario, ScenarioError, ScenarioLoader,
};
pub use self::templates::{Intent, ReplyTemplates};
