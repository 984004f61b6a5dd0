//! Ordered prefix table mapping magic text tokens to command kinds.

use tracing::debug;

use super::DECODER_TARGET;
use crate::command::CommandKind;
use crate::registry::{ConstantsRegistry, FRONT_TO_BACK, RegistryError};

/// Prefix definitions in match order.
///
/// `query_prefix` appears twice; the second definition re-binds the same
/// prefix and therefore never adds an entry of its own.
pub const PREFIX_DEFINITIONS: [(&str, CommandKind); 8] = [
    ("query_prefix", CommandKind::Query),
    ("complete_prefix", CommandKind::DialogueCompleted),
    ("done_prefix", CommandKind::TaskDone),
    ("select_kb_entry_prefix", CommandKind::SelectPrimary),
    ("select_reference_kb_entry_prefix", CommandKind::SelectSecondary),
    ("request_suggestions_prefix", CommandKind::RequestSuggestions),
    ("pick_suggestion_prefix", CommandKind::PickSuggestion),
    ("query_prefix", CommandKind::Query),
];

/// One prefix and the command it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixEntry {
    prefix: String,
    kind: CommandKind,
    key: &'static str,
}

impl PrefixEntry {
    /// The prefix token.
    #[must_use]
    pub const fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// The command kind selected by the prefix.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Registry key the prefix was read from.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }
}

/// Prefix entries in match order; the first entry whose prefix starts the
/// text wins.
///
/// Inserting a prefix that is already present replaces the entry's command
/// but keeps its position. When two registry keys resolve to the same token,
/// the later definition therefore wins at the earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    entries: Vec<PrefixEntry>,
}

impl PrefixTable {
    /// Builds the table from the registry's `front_to_back` tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a prefix token is missing.
    pub fn from_registry(registry: &ConstantsRegistry) -> Result<Self, RegistryError> {
        let mut table = Self::default();
        for (key, kind) in PREFIX_DEFINITIONS {
            let prefix = registry.get(FRONT_TO_BACK, key)?;
            table.insert(prefix, kind, key);
        }
        Ok(table)
    }

    /// Adds a prefix, replacing the command of an identical prefix in place.
    pub fn insert(&mut self, prefix: &str, kind: CommandKind, key: &'static str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.prefix == prefix) {
            if entry.kind != kind {
                debug!(
                    target: DECODER_TARGET,
                    prefix,
                    previous = %entry.kind,
                    replacement = %kind,
                    "prefix re-bound to a different command"
                );
            }
            entry.kind = kind;
            entry.key = key;
            return;
        }
        self.entries.push(PrefixEntry {
            prefix: prefix.to_owned(),
            kind,
            key,
        });
    }

    /// Finds the first entry whose prefix starts `text` and returns it with
    /// the remaining text.
    #[must_use]
    pub fn match_text<'t>(&self, text: &'t str) -> Option<(&PrefixEntry, &'t str)> {
        self.entries.iter().find_map(|entry| {
            text.strip_prefix(entry.prefix.as_str())
                .map(|rest| (entry, rest))
        })
    }

    /// Entries in match order.
    #[must_use]
    pub const fn entries(&self) -> &[PrefixEntry] {
        self.entries.as_slice()
    }

    /// Number of distinct prefixes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no prefix is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
