//! Knowledge-base query constraints.
//!
//! A wizard query arrives in one of three shapes:
//!
//! - a structured list of `{field: expression}` mappings sent as JSON;
//! - text starting with `[` holding the same list as a literal;
//! - older free text holding a literal list of complete constraint mappings.
//!
//! The first two shapes split every mapping into single-field constraints and
//! evaluate each expression with [`parse_literal`]. The free-text shape keeps
//! its mappings whole and performs no per-field evaluation; it is deprecated
//! and only available with the `legacy-query-text` feature.
//!
//! Whatever the shape, the result is never empty. A query without constraints
//! yields one empty [`Constraint`], which matches every knowledge-base entry.

mod errors;
mod literal;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::{QueryEntry, QueryPayload};

pub use self::errors::{ConstraintError, LiteralError};
pub use self::literal::{MAX_DEPTH, parse_literal};

/// Mapping from knowledge-base field names to required values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraint(Map<String, Value>);

impl Constraint {
    /// Creates a single-field constraint.
    #[must_use]
    pub fn single(field: impl Into<String>, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(field.into(), value);
        Self(fields)
    }

    /// Returns `true` for the match-everything constraint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up the value required for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Iterates over field and value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Constraint {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Parses a query payload into an ordered, non-empty list of constraints.
///
/// # Errors
///
/// Returns [`ConstraintError`] when the payload is not a list of mappings or
/// an expression is not a valid literal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use woz_protocol::QueryPayload;
/// use woz_protocol::constraints::constraints_from_payload;
///
/// let payload = QueryPayload::Text("[{'Price': '50'}, {'Area': \"'North'\"}]".to_owned());
/// let constraints = constraints_from_payload(&payload).expect("valid query");
/// assert_eq!(
///     serde_json::to_value(&constraints).expect("serialize"),
///     json!([{"Price": 50}, {"Area": "North"}]),
/// );
/// ```
pub fn constraints_from_payload(
    payload: &QueryPayload,
) -> Result<Vec<Constraint>, ConstraintError> {
    let constraints = match payload {
        QueryPayload::Structured(entries) => evaluate_entries(entries)?,
        QueryPayload::Text(text) if text.starts_with('[') => {
            let entries = literal_entries(text)?;
            evaluate_entries(&entries)?
        }
        QueryPayload::Text(text) => legacy_constraints(text)?,
    };
    Ok(non_empty(constraints))
}

fn non_empty(mut constraints: Vec<Constraint>) -> Vec<Constraint> {
    if constraints.is_empty() {
        constraints.push(Constraint::default());
    }
    constraints
}

// Each field of each entry becomes its own constraint, in order.
fn evaluate_entries(entries: &[QueryEntry]) -> Result<Vec<Constraint>, ConstraintError> {
    entries
        .iter()
        .flat_map(Map::iter)
        .map(|(field, expression)| evaluate_field(field, expression))
        .collect()
}

fn evaluate_field(field: &str, expression: &Value) -> Result<Constraint, ConstraintError> {
    let value = match expression {
        Value::String(source) => {
            parse_literal(source).map_err(|error| ConstraintError::expression(field, error))?
        }
        // Frontends that already send typed values skip evaluation.
        other => other.clone(),
    };
    Ok(Constraint::single(field, value))
}

fn literal_entries(text: &str) -> Result<Vec<QueryEntry>, ConstraintError> {
    let Value::Array(items) = parse_literal(text).map_err(ConstraintError::query)? else {
        return Err(ConstraintError::NotAList);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(entry) => Ok(entry),
            _ => Err(ConstraintError::EntryNotMapping { index }),
        })
        .collect()
}

/// Parses free-text query syntax: a mapping or a sequence of mappings.
///
/// Empty text is rejected as [`LiteralError::UnexpectedEnd`] rather than
/// treated as an empty query, so a bare query prefix never matches every
/// knowledge-base item.
#[cfg(feature = "legacy-query-text")]
fn legacy_constraints(text: &str) -> Result<Vec<Constraint>, ConstraintError> {
    match parse_literal(text).map_err(ConstraintError::query)? {
        Value::Object(entry) => Ok(vec![Constraint::from(entry)]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(entry) => Ok(Constraint::from(entry)),
                _ => Err(ConstraintError::EntryNotMapping { index }),
            })
            .collect(),
        _ => Err(ConstraintError::NotAList),
    }
}

#[cfg(not(feature = "legacy-query-text"))]
const fn legacy_constraints(_text: &str) -> Result<Vec<Constraint>, ConstraintError> {
    Err(ConstraintError::LegacySyntaxDisabled)
}

#[cfg(test)]
mod tests;
