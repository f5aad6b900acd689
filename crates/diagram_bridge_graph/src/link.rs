// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link records and link identity.

use crate::node::{Fields, Key};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A link record of the declarative model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    /// Source node key
    pub from: Key,
    /// Target node key
    pub to: Key,
    /// All other fields, ports and link key included
    #[serde(flatten)]
    pub fields: Fields,
}

impl LinkData {
    /// Create a link record with no fields
    pub fn new(from: impl Into<Key>, to: impl Into<Key>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
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

    /// Check if this link touches a node
    pub fn involves_node(&self, key: &str) -> bool {
        self.from == key || self.to == key
    }
}

/// How links are matched across snapshots
///
/// Links match on `(from, to)`. When a key property is configured and both
/// sides carry a key value for it, the values must match too, which lets
/// explicitly keyed parallel links coexist. Keys may be strings, numbers or
/// booleans; `null` and the empty string mean unkeyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkIdentity {
    key_property: Option<String>,
}

impl LinkIdentity {
    /// Match on endpoints only
    pub fn endpoints() -> Self {
        Self::default()
    }

    /// Match on endpoints plus an optional key property
    pub fn with_key_property(key_property: Option<String>) -> Self {
        Self {
            key_property: key_property.filter(|p| !p.is_empty()),
        }
    }

    /// The configured key property
    pub fn key_property(&self) -> Option<&str> {
        self.key_property.as_deref()
    }

    /// The link's key value, if a key property is configured and set
    pub fn key_of<'a>(&self, link: &'a LinkData) -> Option<&'a Value> {
        self.key_property
            .as_deref()
            .and_then(|property| link_key(link, property))
    }

    /// Check whether two links carry the same key, or are both unkeyed
    pub fn same_key(&self, a: &LinkData, b: &LinkData) -> bool {
        self.key_of(a) == self.key_of(b)
    }

    /// Check whether two links denote the same link
    pub fn matches(&self, a: &LinkData, b: &LinkData) -> bool {
        if a.from != b.from || a.to != b.to {
            return false;
        }
        match (self.key_of(a), self.key_of(b)) {
            (Some(ka), Some(kb)) => ka == kb,
            _ => true,
        }
    }

    /// Build an index of links for repeated lookups
    pub fn index<'a>(&self, links: impl IntoIterator<Item = &'a LinkData>) -> LinkIndex<'a> {
        let mut by_endpoints: HashMap<(&'a str, &'a str), Vec<Option<&'a Value>>> = HashMap::new();
        for link in links {
            by_endpoints
                .entry((link.from.as_str(), link.to.as_str()))
                .or_default()
                .push(self.key_of(link));
        }
        LinkIndex {
            identity: self.clone(),
            by_endpoints,
        }
    }
}

/// Non-empty strings, numbers and booleans count as link keys
fn link_key<'a>(link: &'a LinkData, property: &str) -> Option<&'a Value> {
    match link.fields.get(property)? {
        Value::String(s) if s.is_empty() => None,
        value @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => Some(value),
        _ => None,
    }
}

/// Endpoint-indexed view over a set of links
#[derive(Debug)]
pub struct LinkIndex<'a> {
    identity: LinkIdentity,
    by_endpoints: HashMap<(&'a str, &'a str), Vec<Option<&'a Value>>>,
}

impl LinkIndex<'_> {
    /// Check whether any indexed link matches `link`
    pub fn contains(&self, link: &LinkData) -> bool {
        let Some(keys) = self
            .by_endpoints
            .get(&(link.from.as_str(), link.to.as_str()))
        else {
            return false;
        };
        match self.identity.key_of(link) {
            None => true,
            Some(key) => keys.iter().any(|k| k.map_or(true, |k| k == key)),
        }
    }
}
