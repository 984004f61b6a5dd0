//! Scenario files describing the task each role performs.
//!
//! A scenario is a JSON document named after the scenario:
//!
//! ```json
//! {
//!   "instructions": {
//!     "Wizard": {
//!       "task_description": "Help the user book a ride.",
//!       "completion_requirements": ["The ride is booked"],
//!       "completion_questions": ["Was the user polite?"]
//!     }
//!   },
//!   "form_description": {"Price": {"type": "integer"}}
//! }
//! ```
//!
//! Instructions are keyed by role identifier as found in the registry's
//! `agent_ids` table.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while loading scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// No scenario file exists for the name.
    #[error("scenario file '{path}' does not exist")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The scenario file could not be read.
    #[error("failed to read scenario file '{path}': {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The scenario document is malformed.
    #[error("invalid scenario '{name}': {source}")]
    Parse {
        /// Scenario name.
        name: String,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The scenario has no instructions for a role.
    #[error("scenario '{scenario}' has no instructions for role '{role}'")]
    MissingRole {
        /// Scenario name.
        scenario: String,
        /// Role identifier that was looked up.
        role: String,
    },

    /// The scenario name would escape the scenario directory.
    #[error("invalid scenario name '{name}'")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
}

/// Instructions for one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInstructions {
    /// Task shown to the participant.
    pub task_description: String,
    /// Conditions the participant must meet before finishing.
    pub completion_requirements: Vec<String>,
    /// Questions asked once the task is finished.
    pub completion_questions: Vec<String>,
}

/// A loaded scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name; not part of the document.
    #[serde(skip)]
    pub name: String,
    /// Instructions keyed by role identifier.
    pub instructions: BTreeMap<String, RoleInstructions>,
    /// Knowledge-base search form shown to the wizard.
    #[serde(default = "empty_form")]
    pub form_description: Value,
}

fn empty_form() -> Value {
    Value::Object(Map::new())
}

impl Scenario {
    /// Parses a scenario document.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] for malformed documents.
    pub fn from_json(name: &str, json: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Self =
            serde_json::from_str(json).map_err(|source| ScenarioError::Parse {
                name: name.to_owned(),
                source: Arc::new(source),
            })?;
        name.clone_into(&mut scenario.name);
        Ok(scenario)
    }

    /// Looks up the instructions for a role identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::MissingRole`] when the role is absent.
    pub fn instructions_for(&self, role_id: &str) -> Result<&RoleInstructions, ScenarioError> {
        self.instructions
            .get(role_id)
            .ok_or_else(|| ScenarioError::MissingRole {
                scenario: self.name.clone(),
                role: role_id.to_owned(),
            })
    }
}

/// Source of scenarios by name.
pub trait ScenarioLoader {
    /// Loads the named scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the scenario is unknown or malformed.
    fn load(&self, name: &str) -> Result<Scenario, ScenarioError>;
}

/// Reads `<root>/<name>.json` files.
#[derive(Debug, Clone)]
pub struct DirectoryScenarioLoader {
    root: PathBuf,
}

impl DirectoryScenarioLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory scenarios are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ScenarioError> {
        let invalid = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || Path::new(name).is_absolute();
        if invalid {
            return Err(ScenarioError::InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl ScenarioLoader for DirectoryScenarioLoader {
    fn load(&self, name: &str) -> Result<Scenario, ScenarioError> {
        let path = self.path_for(name)?;
        let json = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ScenarioError::NotFound { path: path.clone() }
            } else {
                ScenarioError::Read {
                    path: path.clone(),
                    source: Arc::new(source),
                }
            }
        })?;
        Scenario::from_json(name, &json)
    }
}

#[cfg(test)]
mod tests;
