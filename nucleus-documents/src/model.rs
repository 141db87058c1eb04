//! Keys, queries and query pages shared by the repository and store layers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An entity stored as a document.
///
/// The repository imposes no schema beyond a stable identifier. The
/// partition key is never derived from the entity; callers pass it to every
/// operation.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The document id, unique within its partition.
    fn id(&self) -> &str;
}

/// Logical key scoping a document for distribution and point lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartitionKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PartitionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for PartitionKey {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl AsRef<str> for PartitionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Query text plus named parameters.
///
/// Parameter names include their `@` prefix and are bound by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<(String, Value)>,
}

impl QueryDefinition {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds or replaces a named parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((name, value)),
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[(String, Value)] {
        &self.parameters
    }

    /// Looks up a parameter by name, `@` prefix included.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl From<&str> for QueryDefinition {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for QueryDefinition {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// One page of raw query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Value>,
    /// Token for the next page; `None` on the last page.
    pub continuation: Option<String>,
}

impl QueryPage {
    pub fn last(items: Vec<Value>) -> Self {
        Self {
            items,
            continuation: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}
