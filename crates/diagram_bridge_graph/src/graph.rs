// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless graph-links model engine.
//!
//! Implements [`DiagramEngine`] with model semantics only: owned data
//! arrays, transactions, a change feed, parts and selection. Nothing is
//! laid out or painted.

use crate::change::{
    ChangeKind, ChangedEvent, ChangedListener, Collection, DataRef, ListenerId, Record,
    TransactionPhase,
};
use crate::config::{ModelConfig, ModelHooks};
use crate::engine::{DiagramEngine, EngineError};
use crate::link::{LinkData, LinkIdentity};
use crate::model::{DiagramModel, ModelRef};
use crate::node::{Key, NodeData};
use crate::part::PartTable;
use crate::transaction::{OpenTransaction, TransactionLog};
use indexmap::IndexSet;
use serde_json::{json, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// A headless diagram engine over a graph-links model
pub struct GraphModelEngine {
    /// Container this engine is bound to
    container_id: String,
    /// Node data array
    nodes: Vec<NodeData>,
    /// Link data array
    links: Vec<LinkData>,
    /// Property names
    config: ModelConfig,
    /// Key and copy hooks
    hooks: ModelHooks,
    /// Link identity derived from the config
    identity: LinkIdentity,
    /// Derived parts
    parts: PartTable,
    /// Selected node keys
    selection: IndexSet<Key>,
    /// Registered listeners, in registration order
    listeners: Vec<(ListenerId, ChangedListener)>,
    next_listener: u64,
    /// Open transaction, if any
    transaction: Option<OpenTransaction>,
    /// Committed transactions
    log: TransactionLog,
}

impl GraphModelEngine {
    /// Create an empty engine bound to a container
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            nodes: Vec::new(),
            links: Vec::new(),
            config: ModelConfig::default(),
            hooks: ModelHooks::default(),
            identity: LinkIdentity::endpoints(),
            parts: PartTable::default(),
            selection: IndexSet::new(),
            listeners: Vec::new(),
            next_listener: 1,
            transaction: None,
            log: TransactionLog::new(),
        }
    }

    /// Container this engine is bound to
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Active configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Derived parts
    pub fn parts(&self) -> &PartTable {
        &self.parts
    }

    /// Selected node keys
    pub fn selection(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(String::as_str)
    }

    /// Committed transactions
    pub fn transaction_log(&self) -> &TransactionLog {
        &self.log
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Duplicate a node, as a copy/paste would
    ///
    /// The copy goes through the copy hook and receives a fresh key.
    pub fn copy_node(&mut self, key: &str) -> Result<Key, EngineError> {
        let source = self
            .find_node(key)
            .map(|i| self.nodes[i].clone())
            .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;
        let copy = match &self.hooks.copy_node_data {
            Some(copier) => copier(&source),
            None => source,
        };
        Ok(self.with_implicit("Copy", |engine| engine.add_node_data(copy)))
    }

    /// Set or clear a node's containing group
    pub fn set_node_group(&mut self, key: &str, group: Option<&str>) -> Result<(), EngineError> {
        let property = self.config.node_group_property.clone();
        let value = group.map_or(Value::Null, |g| Value::String(g.to_string()));
        self.set_data_property(&DataRef::Node(key.to_string()), &property, value)
    }

    fn find_node(&self, key: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    fn find_link(&self, link: &LinkData) -> Option<usize> {
        self.find_unclaimed_link(link, &HashSet::new())
    }

    /// Prefer a link with the same key (or lack of one) over any other match
    fn find_unclaimed_link(&self, link: &LinkData, claimed: &HashSet<usize>) -> Option<usize> {
        let candidates = || {
            self.links
                .iter()
                .enumerate()
                .filter(|(i, l)| !claimed.contains(i) && self.identity.matches(l, link))
        };
        candidates()
            .find(|(_, l)| self.identity.same_key(l, link))
            .or_else(|| candidates().next())
            .map(|(i, _)| i)
    }

    /// Deliver a change to every listener
    fn raise(&mut self, change: ChangeKind) {
        if let Some(open) = self.transaction.as_mut() {
            if !change.is_transaction() {
                open.changes += 1;
            }
        }
        let event = ChangedEvent {
            change: &change,
            model: ModelRef {
                nodes: &self.nodes,
                links: &self.links,
            },
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Run `f` inside a transaction, opening one only if none is open
    fn with_implicit<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        if self.transaction.is_some() {
            return f(self);
        }
        self.open_transaction(name, true);
        let out = f(self);
        self.close_transaction(name);
        out
    }

    fn open_transaction(&mut self, name: &str, implicit: bool) {
        if let Some(open) = self.transaction.as_mut() {
            open.depth += 1;
            return;
        }
        let snapshot = DiagramModel::new(self.nodes.clone(), self.links.clone());
        self.transaction = Some(self.log.open(name, implicit, snapshot));
        tracing::trace!(name, implicit, "transaction started");
        self.raise(ChangeKind::Transaction {
            phase: TransactionPhase::Started,
            name: name.to_string(),
        });
    }

    fn close_transaction(&mut self, name: &str) {
        let Some(open) = self.transaction.as_mut() else {
            return;
        };
        open.depth -= 1;
        if open.depth > 0 {
            return;
        }
        if let Some(open) = self.transaction.take() {
            tracing::trace!(name, changes = open.changes, "transaction committed");
            self.log.record(open, name);
        }
        self.sync_parts();
        self.raise(ChangeKind::Transaction {
            phase: TransactionPhase::Committed,
            name: name.to_string(),
        });
    }

    fn sync_parts(&mut self) {
        self.parts.rebuild(
            ModelRef {
                nodes: &self.nodes,
                links: &self.links,
            },
            &self.config,
            &self.identity,
            &self.selection,
        );
    }

    fn unique_node_key(&self, node: &NodeData) -> Key {
        if !node.key.is_empty() && self.find_node(&node.key).is_none() {
            return node.key.clone();
        }
        if let Some(make_key) = &self.hooks.make_unique_node_key {
            let key = make_key(node);
            if !key.is_empty() && self.find_node(&key).is_none() {
                return key;
            }
        }
        Uuid::new_v4().to_string()
    }

    fn assign_link_key(&self, link: &mut LinkData) {
        let Some(property) = self.identity.key_property() else {
            return;
        };
        if self.identity.key_of(link).is_some() {
            return;
        }
        let key = match &self.hooks.make_unique_link_key {
            Some(make_key) => make_key(link),
            None => Uuid::new_v4().to_string(),
        };
        link.set(property, Value::String(key));
    }

    /// Overwrite fields present in `source`, raising a change per field
    fn merge_fields(&mut self, target: MergeTarget, source: &serde_json::Map<String, Value>) {
        for (property, value) in source {
            let old_value = match target {
                MergeTarget::Node(i) => self.nodes[i].set(property.clone(), value.clone()),
                MergeTarget::Link(i) => self.links[i].set(property.clone(), value.clone()),
            }
            .unwrap_or(Value::Null);
            if old_value == *value {
                continue;
            }
            let record = match target {
                MergeTarget::Node(i) => Record::Node(self.nodes[i].clone()),
                MergeTarget::Link(i) => Record::Link(self.links[i].clone()),
            };
            self.raise(ChangeKind::Property {
                target: record,
                property: property.clone(),
                old_value,
                new_value: value.clone(),
            });
        }
    }
}

#[derive(Clone, Copy)]
enum MergeTarget {
    Node(usize),
    Link(usize),
}

impl DiagramEngine for GraphModelEngine {
    fn start_transaction(&mut self, name: &str) -> Result<(), EngineError> {
        self.open_transaction(name, false);
        Ok(())
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), EngineError> {
        if self.transaction.is_none() {
            return Err(EngineError::NoTransaction);
        }
        self.close_transaction(name);
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), EngineError> {
        let open = self.transaction.take().ok_or(EngineError::NoTransaction)?;
        tracing::trace!(name = %open.name, "transaction rolled back");
        self.nodes = open.snapshot.nodes;
        self.links = open.snapshot.links;
        self.selection.retain(|key| self.nodes.iter().any(|n| n.key == *key));
        self.sync_parts();
        self.raise(ChangeKind::Transaction {
            phase: TransactionPhase::RolledBack,
            name: open.name,
        });
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn node_data(&self) -> &[NodeData] {
        &self.nodes
    }

    fn link_data(&self) -> &[LinkData] {
        &self.links
    }

    fn load_model(&mut self, model: DiagramModel, config: ModelConfig, hooks: ModelHooks) {
        self.identity = config.link_identity();
        self.config = config;
        self.hooks = hooks;
        self.transaction = None;
        self.selection.clear();
        self.nodes.clear();
        self.links.clear();

        for mut node in model.nodes {
            node.key = self.unique_node_key(&node);
            self.nodes.push(node);
        }
        for mut link in model.links {
            self.assign_link_key(&mut link);
            self.links.push(link);
        }
        self.sync_parts();
        let counts = json!({ "nodes": self.nodes.len(), "links": self.links.len() });
        self.raise(ChangeKind::ModelChanged {
            property: "model".to_string(),
            old_value: Value::Null,
            new_value: counts,
        });
    }

    fn add_node_data(&mut self, mut node: NodeData) -> Key {
        self.with_implicit("Add Node", |engine| {
            node.key = engine.unique_node_key(&node);
            let key = node.key.clone();
            engine.nodes.push(node.clone());
            engine.raise(ChangeKind::Insert {
                collection: Collection::Nodes,
                value: Record::Node(node),
            });
            key
        })
    }

    fn remove_node_data(&mut self, key: &str) -> Option<NodeData> {
        self.find_node(key)?;
        self.with_implicit("Remove Node", |engine| {
            // Links first, so their removals are reported before the node's
            let incident: Vec<LinkData> = engine
                .links
                .iter()
                .filter(|l| l.involves_node(key))
                .cloned()
                .collect();
            for link in &incident {
                engine.remove_link_data(link);
            }

            let group_property = engine.config.node_group_property.clone();
            let members: Vec<Key> = engine
                .nodes
                .iter()
                .filter(|n| n.key != key && n.get_str(&group_property) == Some(key))
                .map(|n| n.key.clone())
                .collect();
            for member in members {
                // Members were just found, so the lookup cannot fail
                let _ = engine.set_data_property(&DataRef::Node(member), &group_property, Value::Null);
            }

            let index = engine.find_node(key)?;
            let removed = engine.nodes.remove(index);
            engine.selection.shift_remove(key);
            engine.raise(ChangeKind::Remove {
                collection: Collection::Nodes,
                value: Record::Node(removed.clone()),
            });
            Some(removed)
        })
    }

    fn add_link_data(&mut self, mut link: LinkData) {
        self.with_implicit("Add Link", |engine| {
            engine.assign_link_key(&mut link);
            engine.links.push(link.clone());
            engine.raise(ChangeKind::Insert {
                collection: Collection::Links,
                value: Record::Link(link),
            });
        });
    }

    fn remove_link_data(&mut self, link: &LinkData) -> Option<LinkData> {
        let index = self.find_link(link)?;
        Some(self.with_implicit("Remove Link", |engine| {
            let removed = engine.links.remove(index);
            engine.raise(ChangeKind::Remove {
                collection: Collection::Links,
                value: Record::Link(removed.clone()),
            });
            removed
        }))
    }

    fn add_node_data_collection(&mut self, nodes: Vec<NodeData>) {
        if nodes.is_empty() {
            return;
        }
        self.with_implicit("Add Nodes", |engine| {
            for node in nodes {
                engine.add_node_data(node);
            }
        });
    }

    fn remove_node_data_collection(&mut self, keys: &[Key]) {
        if keys.is_empty() {
            return;
        }
        self.with_implicit("Remove Nodes", |engine| {
            for key in keys {
                engine.remove_node_data(key);
            }
        });
    }

    fn add_link_data_collection(&mut self, links: Vec<LinkData>) {
        if links.is_empty() {
            return;
        }
        self.with_implicit("Add Links", |engine| {
            for link in links {
                engine.add_link_data(link);
            }
        });
    }

    fn remove_link_data_collection(&mut self, links: &[LinkData]) {
        if links.is_empty() {
            return;
        }
        self.with_implicit("Remove Links", |engine| {
            for link in links {
                engine.remove_link_data(link);
            }
        });
    }

    fn set_data_property(
        &mut self,
        target: &DataRef,
        property: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        let target = match target {
            DataRef::Node(key) => {
                if property == "key" {
                    return Err(EngineError::ReadOnlyProperty(property.to_string()));
                }
                self.find_node(key)
                    .map(MergeTarget::Node)
                    .ok_or_else(|| EngineError::NodeNotFound(key.clone()))?
            }
            DataRef::Link(link) => {
                if property == "from" || property == "to" {
                    return Err(EngineError::ReadOnlyProperty(property.to_string()));
                }
                self.find_link(link)
                    .map(MergeTarget::Link)
                    .ok_or_else(|| EngineError::LinkNotFound {
                        from: link.from.clone(),
                        to: link.to.clone(),
                    })?
            }
        };
        let mut fields = serde_json::Map::new();
        fields.insert(property.to_string(), value);
        self.with_implicit("Set Property", |engine| engine.merge_fields(target, &fields));
        Ok(())
    }

    fn merge_node_data(&mut self, nodes: &[NodeData]) {
        self.with_implicit("Merge Nodes", |engine| {
            for node in nodes {
                if let Some(index) = engine.find_node(&node.key) {
                    engine.merge_fields(MergeTarget::Node(index), &node.fields);
                }
            }
        });
    }

    fn merge_link_data(&mut self, links: &[LinkData]) {
        self.with_implicit("Merge Links", |engine| {
            // Keyed links claim their targets before unkeyed ones pick from the rest
            let (keyed, unkeyed): (Vec<_>, Vec<_>) = links
                .iter()
                .partition(|link| engine.identity.key_of(link).is_some());
            let mut claimed = HashSet::new();
            for link in keyed.into_iter().chain(unkeyed) {
                if let Some(index) = engine.find_unclaimed_link(link, &claimed) {
                    claimed.insert(index);
                    engine.merge_fields(MergeTarget::Link(index), &link.fields);
                }
            }
        });
    }

    fn update_all_relationships_from_data(&mut self) {
        self.sync_parts();
    }

    fn update_all_target_bindings(&mut self) {
        self.parts.refresh_bindings(ModelRef {
            nodes: &self.nodes,
            links: &self.links,
        });
    }

    fn add_changed_listener(&mut self, listener: ChangedListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn remove_changed_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn select(&mut self, key: &str) -> bool {
        if self.find_node(key).is_none() {
            return false;
        }
        self.selection.clear();
        self.selection.insert(key.to_string());
        self.parts.apply_selection(&self.selection);
        true
    }

    fn clear(&mut self) {
        let counts = json!({ "nodes": self.nodes.len(), "links": self.links.len() });
        self.nodes.clear();
        self.links.clear();
        self.selection.clear();
        self.parts.clear();
        self.log.clear();
        self.transaction = None;
        self.raise(ChangeKind::ModelChanged {
            property: "clear".to_string(),
            old_value: counts,
            new_value: Value::Null,
        });
    }
}
