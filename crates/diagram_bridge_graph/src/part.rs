// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagram parts: what the engine derives from the data arrays.
//!
//! Parts are the engine-side bookkeeping behind each record: category,
//! group membership, resolved link endpoints and ports, bound values and
//! selection. They are rebuilt from data, never edited directly.

use crate::config::ModelConfig;
use crate::link::{LinkData, LinkIdentity};
use crate::model::ModelRef;
use crate::node::{Fields, Key, NodeData};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Engine-side view of a node
#[derive(Debug, Clone, PartialEq)]
pub struct NodePart {
    /// Node key
    pub key: Key,
    /// Template category; empty for the default template
    pub category: String,
    /// Key of the containing group, if the group exists
    pub group: Option<Key>,
    /// Whether this node is a group
    pub is_group: bool,
    /// Whether this node is selected
    pub selected: bool,
    /// Values bound from data
    pub bindings: Fields,
}

/// Engine-side view of a link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPart {
    /// Source key from data
    pub from: Key,
    /// Target key from data
    pub to: Key,
    /// Link key, when links are keyed
    pub key: Option<Value>,
    /// Resolved source node
    pub from_node: Option<Key>,
    /// Resolved target node
    pub to_node: Option<Key>,
    /// Source port
    pub from_port: Option<String>,
    /// Target port
    pub to_port: Option<String>,
    /// Values bound from data
    pub bindings: Fields,
}

impl LinkPart {
    /// A link is dangling when either endpoint does not resolve
    pub fn is_dangling(&self) -> bool {
        self.from_node.is_none() || self.to_node.is_none()
    }
}

/// All parts of a diagram
#[derive(Debug, Clone, Default)]
pub struct PartTable {
    nodes: IndexMap<Key, NodePart>,
    links: Vec<LinkPart>,
}

impl PartTable {
    /// Rebuild every part from data
    pub(crate) fn rebuild(
        &mut self,
        model: ModelRef<'_>,
        config: &ModelConfig,
        identity: &LinkIdentity,
        selection: &IndexSet<Key>,
    ) {
        self.nodes = model
            .nodes
            .iter()
            .map(|node| (node.key.clone(), node_part(node, config, selection)))
            .collect();

        // Groups must exist to contain anything
        let known: IndexSet<Key> = self.nodes.keys().cloned().collect();
        for part in self.nodes.values_mut() {
            if part.group.as_ref().is_some_and(|g| !known.contains(g) || *g == part.key) {
                part.group = None;
            }
        }

        self.links = model
            .links
            .iter()
            .map(|link| link_part(link, config, identity, &known))
            .collect();
    }

    /// Copy data values into every part's bindings
    pub(crate) fn refresh_bindings(&mut self, model: ModelRef<'_>) {
        for node in model.nodes {
            if let Some(part) = self.nodes.get_mut(&node.key) {
                part.bindings = node.fields.clone();
            }
        }
        for (part, link) in self.links.iter_mut().zip(model.links) {
            part.bindings = link.fields.clone();
        }
    }

    /// Mark the selected nodes
    pub(crate) fn apply_selection(&mut self, selection: &IndexSet<Key>) {
        for part in self.nodes.values_mut() {
            part.selected = selection.contains(&part.key);
        }
    }

    /// Forget everything
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    /// Get a node part by key
    pub fn node(&self, key: &str) -> Option<&NodePart> {
        self.nodes.get(key)
    }

    /// All node parts
    pub fn nodes(&self) -> impl Iterator<Item = &NodePart> {
        self.nodes.values()
    }

    /// All link parts
    pub fn links(&self) -> impl Iterator<Item = &LinkPart> {
        self.links.iter()
    }

    /// Number of node parts
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of link parts
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Nodes contained in a group
    pub fn members_of<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a NodePart> + 'a {
        self.nodes
            .values()
            .filter(move |p| p.group.as_deref() == Some(group))
    }
}

fn node_part(node: &NodeData, config: &ModelConfig, selection: &IndexSet<Key>) -> NodePart {
    NodePart {
        key: node.key.clone(),
        category: node
            .get_str(&config.node_category_property)
            .unwrap_or_default()
            .to_string(),
        group: node.get_str(&config.node_group_property).map(str::to_string),
        is_group: node
            .get(&config.node_is_group_property)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        selected: selection.contains(&node.key),
        bindings: node.fields.clone(),
    }
}

fn link_part(
    link: &LinkData,
    config: &ModelConfig,
    identity: &LinkIdentity,
    known: &IndexSet<Key>,
) -> LinkPart {
    let resolve = |key: &Key| known.contains(key).then(|| key.clone());
    LinkPart {
        from: link.from.clone(),
        to: link.to.clone(),
        key: identity.key_of(link).cloned(),
        from_node: resolve(&link.from),
        to_node: resolve(&link.to),
        from_port: link
            .get_str(&config.link_from_port_property)
            .map(str::to_string),
        to_port: link.get_str(&config.link_to_port_property).map(str::to_string),
        bindings: link.fields.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiagramModel;

    #[test]
    fn test_rebuild_resolves_relationships() {
        let model = DiagramModel::new(
            vec![
                NodeData::new("G").with_field("isGroup", true),
                NodeData::new("A").with_field("group", "G").with_field("category", "big"),
                NodeData::new("B").with_field("group", "missing"),
            ],
            vec![
                LinkData::new("A", "B").with_field("fromPort", "out"),
                LinkData::new("A", "Z"),
            ],
        );
        let mut table = PartTable::default();
        let selection: IndexSet<Key> = ["A".to_string()].into_iter().collect();
        table.rebuild(model.view(), &ModelConfig::default(), &LinkIdentity::endpoints(), &selection);

        assert_eq!(table.node_count(), 3);
        assert!(table.node("G").unwrap().is_group);
        assert_eq!(table.node("A").unwrap().group.as_deref(), Some("G"));
        assert_eq!(table.node("A").unwrap().category, "big");
        assert!(table.node("A").unwrap().selected);
        assert_eq!(table.node("B").unwrap().group, None);
        assert_eq!(table.members_of("G").count(), 1);

        let links: Vec<_> = table.links().collect();
        assert_eq!(links[0].from_port.as_deref(), Some("out"));
        assert!(!links[0].is_dangling());
        assert!(links[1].is_dangling());
    }
}
