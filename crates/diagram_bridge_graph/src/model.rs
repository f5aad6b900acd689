// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagram model aggregate and borrowed model views.

use crate::link::LinkData;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};

/// Declarative snapshot of a diagram: nodes plus links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramModel {
    /// Node records in order
    #[serde(rename = "nodeDataArray", alias = "nodes", default)]
    pub nodes: Vec<NodeData>,
    /// Link records in order
    #[serde(rename = "linkDataArray", alias = "links", default)]
    pub links: Vec<LinkData>,
}

impl DiagramModel {
    /// Create a model from node and link records
    pub fn new(nodes: Vec<NodeData>, links: Vec<LinkData>) -> Self {
        Self { nodes, links }
    }

    /// Find a node by key
    pub fn node(&self, key: &str) -> Option<&NodeData> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Check if a node with this key exists
    pub fn contains_node(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    /// Borrow as a model view
    pub fn view(&self) -> ModelRef<'_> {
        ModelRef {
            nodes: &self.nodes,
            links: &self.links,
        }
    }
}

/// Borrowed view of a model's data arrays
#[derive(Debug, Clone, Copy)]
pub struct ModelRef<'a> {
    /// Node records
    pub nodes: &'a [NodeData],
    /// Link records
    pub links: &'a [LinkData],
}

impl ModelRef<'_> {
    /// Copy the arrays into an owned snapshot
    pub fn snapshot(&self) -> DiagramModel {
        DiagramModel {
            nodes: self.nodes.to_vec(),
            links: self.links.to_vec(),
        }
    }

    /// Find a node by key
    pub fn node(&self, key: &str) -> Option<&NodeData> {
        self.nodes.iter().find(|n| n.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_names() {
        let model: DiagramModel = serde_json::from_value(json!({
            "nodeDataArray": [{ "key": "Alpha" }],
            "linkDataArray": [{ "from": "Alpha", "to": "Alpha" }],
        }))
        .unwrap();
        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.links.len(), 1);

        let short: DiagramModel =
            serde_json::from_value(json!({ "nodes": [{ "key": "Beta" }] })).unwrap();
        assert!(short.contains_node("Beta"));
        assert!(short.links.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let model = DiagramModel::new(vec![NodeData::new("a")], vec![]);
        let snapshot = model.view().snapshot();
        assert_eq!(snapshot, model);
    }
}
