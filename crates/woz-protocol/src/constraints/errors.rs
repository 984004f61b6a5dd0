//! Errors raised while parsing query literals and constraints.

use thiserror::Error;

/// Errors surfaced by [`parse_literal`](super::parse_literal).
///
/// Offsets are byte positions in the parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// The text ended before a complete literal was read.
    #[error("unexpected end of literal")]
    UnexpectedEnd,

    /// A character that cannot start or continue a literal here.
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter {
        /// Character found.
        found: char,
        /// Byte offset of the character.
        offset: usize,
    },

    /// A string literal has no closing quote on its line.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },

    /// A `\x`, `\u`, or `\U` escape is truncated or names no character.
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape {
        /// Byte offset of the backslash.
        offset: usize,
    },

    /// Text that looks like a number but is not a valid numeric literal.
    #[error("invalid numeric literal '{literal}'")]
    InvalidNumber {
        /// Literal as written.
        literal: String,
    },

    /// A numeric literal outside the representable range.
    #[error("numeric literal '{literal}' is out of range")]
    NumberOutOfRange {
        /// Literal as written.
        literal: String,
    },

    /// An identifier other than `True`, `False`, or `None`.
    #[error("unknown name '{name}'; only True, False, and None are allowed")]
    UnknownName {
        /// Identifier found.
        name: String,
    },

    /// A mapping key that is not a string.
    #[error("mapping key at offset {offset} is not a string")]
    NonStringKey {
        /// Byte offset of the key.
        offset: usize,
    },

    /// Text remains after a complete literal.
    #[error("unexpected trailing characters at offset {offset}")]
    TrailingCharacters {
        /// Byte offset of the first trailing character.
        offset: usize,
    },

    /// Collections are nested deeper than the parser allows.
    #[error("literal nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// Maximum nesting depth.
        limit: usize,
    },
}

/// Errors raised while turning a query payload into constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// The query text is not a valid literal.
    #[error("query is not a valid literal: {source}")]
    Query {
        /// Parse failure.
        #[source]
        source: LiteralError,
    },

    /// A field expression is not a valid literal.
    #[error("expression for field '{field}' is not a valid literal: {source}")]
    Expression {
        /// Field whose expression failed.
        field: String,
        /// Parse failure.
        #[source]
        source: LiteralError,
    },

    /// The query text does not evaluate to a list.
    #[error("query must be a list of mappings")]
    NotAList,

    /// A list entry is not a mapping.
    #[error("query entry {index} is not a mapping")]
    EntryNotMapping {
        /// Zero-based position of the entry.
        index: usize,
    },

    /// Free-text query syntax was sent but support for it is compiled out.
    #[error("free-text query syntax is disabled; send a bracketed or structured query")]
    LegacySyntaxDisabled,
}

impl ConstraintError {
    /// Wraps a failure to parse the whole query text.
    #[must_use]
    pub const fn query(source: LiteralError) -> Self {
        Self::Query { source }
    }

    /// Wraps a failure to parse one field expression.
    #[must_use]
    pub fn expression(field: impl Into<String>, source: LiteralError) -> Self {
        Self::Expression {
            field: field.into(),
            source,
        }
    }
}
