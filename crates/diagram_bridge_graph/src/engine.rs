// SPDX-License-Identifier: MIT OR Apache-2.0
//! The boundary between the synchronization core and a diagramming engine.

use crate::change::{ChangedListener, DataRef, ListenerId};
use crate::config::{ModelConfig, ModelHooks};
use crate::link::LinkData;
use crate::model::{DiagramModel, ModelRef};
use crate::node::{Key, NodeData};
use serde_json::Value;

/// A stateful, mutable diagramming engine
///
/// Engines own copies of the data they are given and report every mutation
/// to registered listeners synchronously, from inside the operation that
/// caused it. Transactions group mutations; only the outermost transaction
/// raises lifecycle markers.
pub trait DiagramEngine {
    /// Begin a transaction
    fn start_transaction(&mut self, name: &str) -> Result<(), EngineError>;

    /// Commit the current transaction
    fn commit_transaction(&mut self, name: &str) -> Result<(), EngineError>;

    /// Abandon the current transaction
    fn rollback_transaction(&mut self) -> Result<(), EngineError>;

    /// Check if a transaction is open
    fn in_transaction(&self) -> bool;

    /// Live node data array
    fn node_data(&self) -> &[NodeData];

    /// Live link data array
    fn link_data(&self) -> &[LinkData];

    /// Both live arrays
    fn model(&self) -> ModelRef<'_> {
        ModelRef {
            nodes: self.node_data(),
            links: self.link_data(),
        }
    }

    /// Find a node by key
    fn find_node_data(&self, key: &str) -> Option<&NodeData> {
        self.node_data().iter().find(|n| n.key == key)
    }

    /// Replace the whole model, configuration and hooks included
    fn load_model(&mut self, model: DiagramModel, config: ModelConfig, hooks: ModelHooks);

    /// Insert a node
    fn add_node_data(&mut self, node: NodeData) -> Key;

    /// Remove a node, detaching its links first
    fn remove_node_data(&mut self, key: &str) -> Option<NodeData>;

    /// Insert a link
    fn add_link_data(&mut self, link: LinkData);

    /// Remove a link by identity
    fn remove_link_data(&mut self, link: &LinkData) -> Option<LinkData>;

    /// Insert several nodes
    fn add_node_data_collection(&mut self, nodes: Vec<NodeData>) {
        for node in nodes {
            self.add_node_data(node);
        }
    }

    /// Remove several nodes by key
    fn remove_node_data_collection(&mut self, keys: &[Key]) {
        for key in keys {
            self.remove_node_data(key);
        }
    }

    /// Insert several links
    fn add_link_data_collection(&mut self, links: Vec<LinkData>) {
        for link in links {
            self.add_link_data(link);
        }
    }

    /// Remove several links by identity
    fn remove_link_data_collection(&mut self, links: &[LinkData]) {
        for link in links {
            self.remove_link_data(link);
        }
    }

    /// Set one property of a record
    fn set_data_property(
        &mut self,
        target: &DataRef,
        property: &str,
        value: Value,
    ) -> Result<(), EngineError>;

    /// Merge node records into matching nodes, by key
    fn merge_node_data(&mut self, nodes: &[NodeData]);

    /// Merge link records into matching links, by identity
    fn merge_link_data(&mut self, links: &[LinkData]);

    /// Recompute link endpoints and group membership from data
    fn update_all_relationships_from_data(&mut self);

    /// Refresh every data binding from data
    fn update_all_target_bindings(&mut self);

    /// Register a change listener
    fn add_changed_listener(&mut self, listener: ChangedListener) -> ListenerId;

    /// Unregister a change listener
    fn remove_changed_listener(&mut self, id: ListenerId) -> bool;

    /// Select a node by key, replacing the selection
    fn select(&mut self, key: &str) -> bool;

    /// Remove everything
    fn clear(&mut self);
}

/// Error raised by an engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Commit or rollback without an open transaction
    #[error("No transaction in progress")]
    NoTransaction,

    /// Property cannot be set through `set_data_property`
    #[error("Property is read-only: {0}")]
    ReadOnlyProperty(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(Key),

    /// Link not found
    #[error("Link not found: {from} -> {to}")]
    LinkNotFound {
        /// Source key
        from: Key,
        /// Target key
        to: Key,
    },

    /// Engine could not be created
    #[error("Engine factory failed: {0}")]
    Factory(String),
}
