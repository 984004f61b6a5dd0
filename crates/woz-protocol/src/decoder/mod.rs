//! Prefix-based decoding of inbound frontend messages.
//!
//! The frontend marks commands by starting the message text with a magic
//! token such as `[DONE]` or `?`. The [`Decoder`] strips the first matching
//! token, hands the remaining text to the selected command constructor as
//! `extracted_from_text`, and falls back to [`Utter`](crate::Utter) when no
//! token matches.

mod prefix;

use std::sync::Arc;

use tracing::debug;

use crate::command::{Command, CommandError, CommandKind, InboundMessage, MessageFields};
use crate::participant::Participant;
use crate::registry::{ConstantsRegistry, RegistryError};

pub use self::prefix::{PREFIX_DEFINITIONS, PrefixEntry, PrefixTable};

/// Tracing target for decoding.
pub(crate) const DECODER_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::decoder");

/// Turns inbound messages into commands.
///
/// The prefix table is built once from the registry; decoding itself is a
/// pure function of the message and sender.
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<ConstantsRegistry>,
    prefixes: PrefixTable,
}

impl Decoder {
    /// Creates a decoder for the registry's prefix tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a prefix token is missing.
    pub fn new(registry: Arc<ConstantsRegistry>) -> Result<Self, RegistryError> {
        let prefixes = PrefixTable::from_registry(&registry)?;
        Ok(Self { registry, prefixes })
    }

    /// Creates a decoder with a caller-supplied prefix table.
    #[must_use]
    pub const fn with_prefixes(registry: Arc<ConstantsRegistry>, prefixes: PrefixTable) -> Self {
        Self { registry, prefixes }
    }

    /// Token registry used for backend command names.
    #[must_use]
    pub fn registry(&self) -> &ConstantsRegistry {
        &self.registry
    }

    /// Prefix table in match order.
    #[must_use]
    pub const fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Decodes one inbound message.
    ///
    /// An absent message yields `Ok(None)`. An absent `text` field is treated
    /// as empty for prefix matching; the constructor still sees it as absent.
    ///
    /// # Errors
    ///
    /// Propagates the [`CommandError`] of the selected constructor.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use woz_protocol::{Command, ConstantsRegistry, Decoder, InboundMessage, Participant};
    ///
    /// let registry = Arc::new(ConstantsRegistry::bundled().expect("bundled table"));
    /// let decoder = Decoder::new(registry).expect("decoder");
    /// let user = Participant::new("User");
    ///
    /// let message = InboundMessage::with_text("hi there");
    /// let command = decoder.decode(Some(&message), Some(&user)).expect("decode");
    /// assert!(matches!(command, Some(Command::Utter(_))));
    /// assert!(decoder.decode(None, Some(&user)).expect("decode").is_none());
    /// ```
    #[doc(alias = "command_from_message")]
    pub fn decode(
        &self,
        message: Option<&InboundMessage>,
        sender: Option<&Participant>,
    ) -> Result<Option<Command>, CommandError> {
        let Some(inbound) = message else {
            return Ok(None);
        };
        let text = inbound.text.as_deref().unwrap_or_default();
        let (kind, extracted) = match self.prefixes.match_text(text) {
            Some((entry, rest)) => (entry.kind(), Some(rest)),
            None => (CommandKind::Utter, None),
        };
        debug!(
            target: DECODER_TARGET,
            command = %kind,
            sender = sender.map(Participant::id),
            "decoding message"
        );
        let fields = MessageFields::new(inbound, extracted);
        kind.constructor()(sender, &fields, &self.registry).map(Some)
    }
}

#[cfg(test)]
mod tests;
