// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a node (and of a keyed link)
pub type Key = String;

/// Arbitrary record fields, kept in insertion order
pub type Fields = Map<String, Value>;

/// A node record of the declarative model
///
/// Identity is the `key`; everything else lives in `fields` and is
/// flattened next to it when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Unique key within a model snapshot
    #[serde(default)]
    pub key: Key,
    /// All other fields
    #[serde(flatten)]
    pub fields: Fields,
}

impl NodeData {
    /// Create a node record with no fields
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            fields: Fields::new(),
        }
    }

    /// Set a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a string field, treating empty strings as absent
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Read a property, including the key itself
    ///
    /// Missing properties read as `Value::Null`.
    pub fn property(&self, name: &str) -> Value {
        if name == "key" {
            return Value::String(self.key.clone());
        }
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }
}
