//! Conversation participants and their protocol roles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::ConstantsRegistry;

/// Identity of a human participant sending or receiving messages.
///
/// The identifier is the value written to the `id` field of messages the
/// participant sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant {
    id: String,
}

impl Participant {
    /// Creates a participant with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the participant identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Conversational role assigned to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The operator answering on behalf of the system.
    Wizard,
    /// The conversational counterpart.
    User,
}

impl Role {
    /// Resolves the role identifier from the registry's `agent_ids` table.
    #[must_use]
    pub fn id(self, registry: &ConstantsRegistry) -> &str {
        let agents = registry.agents();
        match self {
            Self::Wizard => agents.wizard.as_str(),
            Self::User => agents.user.as_str(),
        }
    }

    /// Builds the participant that plays this role.
    #[must_use]
    pub fn participant(self, registry: &ConstantsRegistry) -> Participant {
        Participant::new(self.id(registry))
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wizard => "wizard",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
