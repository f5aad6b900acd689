// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change events delivered to the caller.

use diagram_bridge_graph::{DiagramModel, LinkData, NodeData};
use std::fmt;

/// Kind of change the caller should apply to its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEventKind {
    /// A record was added
    Add,
    /// A record was removed
    Remove,
    /// A node moved into or out of a group
    Group,
}

impl fmt::Display for ChangeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "Add",
            Self::Remove => "Remove",
            Self::Group => "Group",
        };
        f.write_str(name)
    }
}

/// The record a change event is about
#[derive(Debug, Clone, PartialEq)]
pub enum EventSubject {
    /// A node record
    Node(NodeData),
    /// A link record
    Link(LinkData),
}

/// A change the engine made, as seen by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// What happened
    pub kind: ChangeEventKind,
    /// The affected record
    pub subject: EventSubject,
    /// The engine's full model right after the change
    pub model: DiagramModel,
}

impl ChangeEvent {
    /// A node was added
    pub fn node_added(node: NodeData, model: DiagramModel) -> Self {
        Self::new(ChangeEventKind::Add, EventSubject::Node(node), model)
    }

    /// A link was added
    pub fn link_added(link: LinkData, model: DiagramModel) -> Self {
        Self::new(ChangeEventKind::Add, EventSubject::Link(link), model)
    }

    /// A node was removed
    pub fn node_removed(node: NodeData, model: DiagramModel) -> Self {
        Self::new(ChangeEventKind::Remove, EventSubject::Node(node), model)
    }

    /// A link was removed
    pub fn link_removed(link: LinkData, model: DiagramModel) -> Self {
        Self::new(ChangeEventKind::Remove, EventSubject::Link(link), model)
    }

    /// A node's group changed; `node` is its current record
    pub fn grouped(node: NodeData, model: DiagramModel) -> Self {
        Self::new(ChangeEventKind::Group, EventSubject::Node(node), model)
    }

    fn new(kind: ChangeEventKind, subject: EventSubject, model: DiagramModel) -> Self {
        Self {
            kind,
            subject,
            model,
        }
    }

    /// The node record, for node events
    pub fn node_data(&self) -> Option<&NodeData> {
        match &self.subject {
            EventSubject::Node(node) => Some(node),
            EventSubject::Link(_) => None,
        }
    }

    /// The link record, for link events
    pub fn link_data(&self) -> Option<&LinkData> {
        match &self.subject {
            EventSubject::Link(link) => Some(link),
            EventSubject::Node(_) => None,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            EventSubject::Node(node) => write!(f, "{} node {}", self.kind, node.key),
            EventSubject::Link(link) => write!(f, "{} link {} -> {}", self.kind, link.from, link.to),
        }
    }
}
