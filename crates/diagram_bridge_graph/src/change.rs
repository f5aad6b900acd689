// SPDX-License-Identifier: MIT OR Apache-2.0
//! Raw change events raised by an engine.

use crate::link::LinkData;
use crate::model::ModelRef;
use crate::node::{Key, NodeData};
use serde_json::Value;
use std::fmt;

/// Which data array a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The node data array
    Nodes,
    /// The link data array
    Links,
}

impl Collection {
    /// Name of the model property holding this array
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Nodes => "nodeDataArray",
            Self::Links => "linkDataArray",
        }
    }
}

/// A node or link record
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Node record
    Node(NodeData),
    /// Link record
    Link(LinkData),
}

impl Record {
    /// Which collection this record belongs to
    pub fn collection(&self) -> Collection {
        match self {
            Self::Node(_) => Collection::Nodes,
            Self::Link(_) => Collection::Links,
        }
    }

    /// The node record, if this is one
    pub fn as_node(&self) -> Option<&NodeData> {
        match self {
            Self::Node(node) => Some(node),
            Self::Link(_) => None,
        }
    }

    /// The link record, if this is one
    pub fn as_link(&self) -> Option<&LinkData> {
        match self {
            Self::Link(link) => Some(link),
            Self::Node(_) => None,
        }
    }
}

/// Reference to a record living inside an engine
#[derive(Debug, Clone, PartialEq)]
pub enum DataRef {
    /// A node, by key
    Node(Key),
    /// A link, by identity
    Link(LinkData),
}

/// Transaction lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    /// Outermost transaction began
    Started,
    /// Outermost transaction committed
    Committed,
    /// Outermost transaction was abandoned
    RolledBack,
}

/// What changed
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// Transaction lifecycle marker
    Transaction {
        /// Lifecycle phase
        phase: TransactionPhase,
        /// Transaction name
        name: String,
    },
    /// A record was inserted into a collection
    Insert {
        /// Target collection
        collection: Collection,
        /// Inserted record
        value: Record,
    },
    /// A record was removed from a collection
    Remove {
        /// Source collection
        collection: Collection,
        /// Removed record
        value: Record,
    },
    /// A property of a record changed
    Property {
        /// The record after the change
        target: Record,
        /// Property name
        property: String,
        /// Previous value
        old_value: Value,
        /// New value
        new_value: Value,
    },
    /// A model-level property changed (model replaced, cleared)
    ModelChanged {
        /// Property name
        property: String,
        /// Previous value
        old_value: Value,
        /// New value
        new_value: Value,
    },
}

impl ChangeKind {
    /// The changed property name, as reported by the engine
    pub fn property_name(&self) -> &str {
        match self {
            Self::Transaction { .. } => "",
            Self::Insert { collection, .. } | Self::Remove { collection, .. } => {
                collection.property_name()
            }
            Self::Property { property, .. } | Self::ModelChanged { property, .. } => property,
        }
    }

    /// Check if this is a transaction marker
    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction { .. })
    }
}

/// A raw change event plus the live model at the time it was raised
#[derive(Debug, Clone, Copy)]
pub struct ChangedEvent<'a> {
    /// What changed
    pub change: &'a ChangeKind,
    /// The engine's data arrays after the change
    pub model: ModelRef<'a>,
}

/// Synchronous observer of raw change events
pub type ChangedListener = Box<dyn FnMut(&ChangedEvent<'_>)>;

/// Handle for a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}
