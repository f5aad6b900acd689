// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural diff between the declarative model and engine data.
//!
//! Records are matched by identity only: node key, or link identity as
//! configured. Anything matched is left for the field merge; only strictly
//! missing or extra records become structural operations.

use diagram_bridge_graph::{Key, LinkData, LinkIdentity, NodeData};
use std::collections::HashSet;

/// Structural link changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDiff {
    /// Declared links the engine lacks
    pub to_add: Vec<LinkData>,
    /// Engine links no longer declared
    pub to_remove: Vec<LinkData>,
}

/// Structural node changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDiff {
    /// Declared nodes the engine lacks
    pub to_add: Vec<NodeData>,
    /// Keys of engine nodes no longer declared
    pub to_remove: Vec<Key>,
}

/// Counts of structural operations issued by one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Links added
    pub links_added: usize,
    /// Links removed
    pub links_removed: usize,
    /// Nodes added
    pub nodes_added: usize,
    /// Nodes removed
    pub nodes_removed: usize,
}

impl ReconcileStats {
    /// Total structural operations
    pub fn structural_ops(&self) -> usize {
        self.links_added + self.links_removed + self.nodes_added + self.nodes_removed
    }

    /// Check if the pass changed no structure
    pub fn is_empty(&self) -> bool {
        self.structural_ops() == 0
    }
}

/// Diff links by identity
pub fn diff_links(declared: &[LinkData], engine: &[LinkData], identity: &LinkIdentity) -> LinkDiff {
    let in_engine = identity.index(engine);
    let in_declared = identity.index(declared);
    LinkDiff {
        to_add: declared
            .iter()
            .filter(|link| !in_engine.contains(link))
            .cloned()
            .collect(),
        to_remove: engine
            .iter()
            .filter(|link| !in_declared.contains(link))
            .cloned()
            .collect(),
    }
}

/// Diff nodes by key
pub fn diff_nodes(declared: &[NodeData], engine: &[NodeData]) -> NodeDiff {
    let in_engine: HashSet<&str> = engine.iter().map(|n| n.key.as_str()).collect();
    let in_declared: HashSet<&str> = declared.iter().map(|n| n.key.as_str()).collect();
    NodeDiff {
        to_add: declared
            .iter()
            .filter(|node| !in_engine.contains(node.key.as_str()))
            .cloned()
            .collect(),
        to_remove: engine
            .iter()
            .filter(|node| !in_declared.contains(node.key.as_str()))
            .map(|node| node.key.clone())
            .collect(),
    }
}
