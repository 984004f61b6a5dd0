//! Protocol token registry.
//!
//! The frontend and backend agree on a table of tokens grouped by category:
//! command names sent from the backend (`back_to_front`), prefix strings that
//! mark frontend commands (`front_to_back`), and participant identifiers
//! (`agent_ids`). The table is loaded once, validated eagerly, and is
//! read-only afterwards. A missing token is a configuration failure raised at
//! load time, never a per-message error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

/// Token table compiled into the crate.
pub const BUNDLED_CONSTANTS: &str = include_str!("../../data/constants.json");

/// Category holding backend command names.
pub const BACK_TO_FRONT: &str = "back_to_front";
/// Category holding frontend prefix tokens.
pub const FRONT_TO_BACK: &str = "front_to_back";
/// Category holding participant identifiers.
pub const AGENT_IDS: &str = "agent_ids";

const REGISTRY_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::registry");

const REQUIRED_KEYS: &[(&str, &[&str])] = &[
    (
        BACK_TO_FRONT,
        &["command_setup", "command_review", "command_supply_suggestions"],
    ),
    (
        FRONT_TO_BACK,
        &[
            "query_prefix",
            "complete_prefix",
            "done_prefix",
            "select_kb_entry_prefix",
            "select_reference_kb_entry_prefix",
            "request_suggestions_prefix",
            "pick_suggestion_prefix",
        ],
    ),
    (
        AGENT_IDS,
        &["system_id", "wizard_id", "user_id", "knowledgebase_id"],
    ),
];

type Tables = BTreeMap<String, BTreeMap<String, String>>;

/// Errors raised while loading or querying the token registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The constants file could not be read.
    #[error("failed to read constants from '{path}': {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The constants document is not a two-level map of strings.
    #[error("malformed constants table from {origin}: {source}")]
    Parse {
        /// Human-readable description of where the table came from.
        origin: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A category is absent from the table.
    #[error("constants table has no category '{category}'")]
    MissingCategory {
        /// Category that was looked up.
        category: String,
    },

    /// A key is absent from an existing category.
    #[error("constants category '{category}' has no key '{key}'")]
    MissingKey {
        /// Category that was searched.
        category: String,
        /// Key that was looked up.
        key: String,
    },

    /// A prefix token is empty and would match every message.
    #[error("prefix token '{key}' must not be empty")]
    EmptyPrefix {
        /// Key of the empty prefix.
        key: String,
    },
}

impl RegistryError {
    fn missing_category(category: &str) -> Self {
        Self::MissingCategory {
            category: category.to_owned(),
        }
    }

    fn missing_key(category: &str, key: &str) -> Self {
        Self::MissingKey {
            category: category.to_owned(),
            key: key.to_owned(),
        }
    }
}

/// Command names the backend embeds in outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTokens {
    /// Token announcing task setup.
    pub setup: String,
    /// Token asking a worker to review the dialogue.
    pub review: String,
    /// Token prefixing a list of reply suggestions.
    pub supply_suggestions: String,
}

/// Participant identifiers used as message `id` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIds {
    /// Identifier of backend system notices.
    pub system: String,
    /// Identifier of the wizard operator.
    pub wizard: String,
    /// Identifier of the user.
    pub user: String,
    /// Identifier of knowledge-base lookups.
    pub knowledge_base: String,
}

/// Validated, immutable protocol token table.
///
/// # Example
///
/// ```
/// use woz_protocol::ConstantsRegistry;
///
/// let registry = ConstantsRegistry::bundled().expect("bundled table is valid");
/// assert_eq!(registry.get("front_to_back", "done_prefix").expect("token"), "[DONE]");
/// assert!(registry.get("front_to_back", "bogus").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantsRegistry {
    tables: Tables,
    backend: BackendTokens,
    agents: AgentIds,
}

impl ConstantsRegistry {
    /// Parses the table compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the bundled table is malformed.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_json_str(BUNDLED_CONSTANTS, "bundled constants")
    }

    /// Parses and validates a JSON constants document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] for malformed JSON and the
    /// `Missing*`/`EmptyPrefix` variants when validation fails.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, RegistryError> {
        let tables: Tables =
            serde_json::from_str(json).map_err(|source| RegistryError::Parse {
                origin: origin.to_owned(),
                source,
            })?;
        Self::from_tables(tables)
    }

    /// Reads and validates a constants file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Read`] when the file cannot be read, otherwise
    /// the errors of [`Self::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Self::from_json_str(&json, &format!("'{}'", path.display()))
    }

    /// Validates an already parsed table.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing category or key, or the
    /// first empty prefix token.
    pub fn from_tables(tables: Tables) -> Result<Self, RegistryError> {
        validate(&tables)?;
        let token = |category: &str, key: &str| lookup(&tables, category, key).map(str::to_owned);
        let backend = BackendTokens {
            setup: token(BACK_TO_FRONT, "command_setup")?,
            review: token(BACK_TO_FRONT, "command_review")?,
            supply_suggestions: token(BACK_TO_FRONT, "command_supply_suggestions")?,
        };
        let agents = AgentIds {
            system: token(AGENT_IDS, "system_id")?,
            wizard: token(AGENT_IDS, "wizard_id")?,
            user: token(AGENT_IDS, "user_id")?,
            knowledge_base: token(AGENT_IDS, "knowledgebase_id")?,
        };
        Ok(Self {
            tables,
            backend,
            agents,
        })
    }

    /// Looks up a token by category and key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingCategory`] or
    /// [`RegistryError::MissingKey`] when the token is absent.
    pub fn get(&self, category: &str, key: &str) -> Result<&str, RegistryError> {
        lookup(&self.tables, category, key)
    }

    /// Backend command names.
    #[must_use]
    pub const fn backend(&self) -> &BackendTokens {
        &self.backend
    }

    /// Participant identifiers.
    #[must_use]
    pub const fn agents(&self) -> &AgentIds {
        &self.agents
    }
}

fn lookup<'a>(tables: &'a Tables, category: &str, key: &str) -> Result<&'a str, RegistryError> {
    let entries = tables
        .get(category)
        .ok_or_else(|| RegistryError::missing_category(category))?;
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| RegistryError::missing_key(category, key))
}

fn validate(tables: &Tables) -> Result<(), RegistryError> {
    for (category, keys) in REQUIRED_KEYS {
        for key in *keys {
            let token = lookup(tables, category, key)?;
            if *category == FRONT_TO_BACK && token.is_empty() {
                return Err(RegistryError::EmptyPrefix {
                    key: (*key).to_owned(),
                });
            }
        }
    }
    Ok(())
}

/// Where a [`RegistrySource`] reads its table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantsOrigin {
    /// The table compiled into the crate.
    Bundled,
    /// A JSON file on disk.
    File(PathBuf),
}

/// Loads the registry at most once and hands out shared references.
///
/// The source is an ordinary value owned by the application; there is no
/// process-wide cache. Concurrent first calls may race, but only one result
/// is stored and every caller observes the same table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use woz_protocol::RegistrySource;
///
/// let source = RegistrySource::bundled();
/// let first = source.load().expect("load");
/// let second = source.load().expect("load again");
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug)]
pub struct RegistrySource {
    origin: ConstantsOrigin,
    cache: OnceCell<Arc<ConstantsRegistry>>,
}

impl RegistrySource {
    /// Creates a source backed by the bundled table.
    #[must_use]
    pub const fn bundled() -> Self {
        Self::new(ConstantsOrigin::Bundled)
    }

    /// Creates a source backed by a JSON file.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ConstantsOrigin::File(path.into()))
    }

    /// Creates a source for the given origin.
    #[must_use]
    pub const fn new(origin: ConstantsOrigin) -> Self {
        Self {
            origin,
            cache: OnceCell::new(),
        }
    }

    /// Returns where the table is read from.
    #[must_use]
    pub const fn origin(&self) -> &ConstantsOrigin {
        &self.origin
    }

    /// Loads the registry, reusing the cached table after the first success.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the table cannot be read or fails
    /// validation. Failed loads are not cached.
    pub fn load(&self) -> Result<Arc<ConstantsRegistry>, RegistryError> {
        self.cache
            .get_or_try_init(|| {
                debug!(target: REGISTRY_TARGET, origin = ?self.origin, "loading constants");
                let registry = match &self.origin {
                    ConstantsOrigin::Bundled => ConstantsRegistry::bundled()?,
                    ConstantsOrigin::File(path) => ConstantsRegistry::from_path(path)?,
                };
                Ok(Arc::new(registry))
            })
            .cloned()
    }
}
