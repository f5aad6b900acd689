// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translation of raw engine changes into caller-facing change events.
//!
//! Every handler is offered every raw change. A handler that applies
//! checks its guard against the declarative model and, if the guard
//! passes, forwards one [`ChangeEvent`] to the sink. The guards are what
//! keep changes the caller itself asked for from being echoed back.

use crate::event::ChangeEvent;
use diagram_bridge_graph::{
    ChangeKind, ChangedEvent, Collection, DiagramModel, LinkData, LinkIdentity, Record,
};

/// Receives change events from handlers
pub trait NotificationSink {
    /// Accept one event
    fn notify(&mut self, event: ChangeEvent);
}

impl NotificationSink for Vec<ChangeEvent> {
    fn notify(&mut self, event: ChangeEvent) {
        self.push(event);
    }
}

/// What handlers need to know about the caller's side
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// The declarative model of the most recent update
    pub declarative: &'a DiagramModel,
    /// How links are matched
    pub identity: &'a LinkIdentity,
    /// Node property holding the containing group
    pub group_property: &'a str,
}

impl HandlerContext<'_> {
    fn has_link(&self, link: &LinkData) -> bool {
        self.declarative
            .links
            .iter()
            .any(|l| self.identity.matches(l, link))
    }
}

/// One handler per raw change shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeHandler {
    /// Node inserted
    AddNode,
    /// Link inserted
    AddLink,
    /// Node removed
    RemoveNode,
    /// Link removed
    RemoveLink,
    /// Node group property changed
    GroupNode,
}

impl ChangeHandler {
    /// Every handler, in dispatch order
    pub const ALL: [ChangeHandler; 5] = [
        Self::AddNode,
        Self::AddLink,
        Self::RemoveNode,
        Self::RemoveLink,
        Self::GroupNode,
    ];

    /// Check whether this handler applies to a raw change
    pub fn can_handle(self, change: &ChangeKind, ctx: &HandlerContext<'_>) -> bool {
        match (self, change) {
            (Self::AddNode, ChangeKind::Insert { collection, .. }) => {
                *collection == Collection::Nodes
            }
            (Self::AddLink, ChangeKind::Insert { collection, .. }) => {
                *collection == Collection::Links
            }
            (Self::RemoveNode, ChangeKind::Remove { collection, .. }) => {
                *collection == Collection::Nodes
            }
            (Self::RemoveLink, ChangeKind::Remove { collection, .. }) => {
                *collection == Collection::Links
            }
            (
                Self::GroupNode,
                ChangeKind::Property {
                    target: Record::Node(_),
                    property,
                    ..
                },
            ) => property == ctx.group_property,
            _ => false,
        }
    }

    /// Translate a raw change and forward the result, if the guard allows
    ///
    /// Returns whether an event was forwarded.
    pub fn handle(
        self,
        evt: &ChangedEvent<'_>,
        ctx: &HandlerContext<'_>,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let event = match (self, evt.change) {
            (Self::AddNode, ChangeKind::Insert { value: Record::Node(node), .. }) => {
                if ctx.declarative.contains_node(&node.key) {
                    tracing::trace!(key = %node.key, "node insert already declared");
                    return false;
                }
                ChangeEvent::node_added(node.clone(), evt.model.snapshot())
            }
            (Self::AddLink, ChangeKind::Insert { value: Record::Link(link), .. }) => {
                if ctx.has_link(link) {
                    tracing::trace!(from = %link.from, to = %link.to, "link insert already declared");
                    return false;
                }
                ChangeEvent::link_added(link.clone(), evt.model.snapshot())
            }
            (Self::RemoveNode, ChangeKind::Remove { value: Record::Node(node), .. }) => {
                if !ctx.declarative.contains_node(&node.key) {
                    tracing::trace!(key = %node.key, "node removal already declared");
                    return false;
                }
                ChangeEvent::node_removed(node.clone(), evt.model.snapshot())
            }
            (Self::RemoveLink, ChangeKind::Remove { value: Record::Link(link), .. }) => {
                if !ctx.has_link(link) {
                    tracing::trace!(from = %link.from, to = %link.to, "link removal already declared");
                    return false;
                }
                ChangeEvent::link_removed(link.clone(), evt.model.snapshot())
            }
            (Self::GroupNode, ChangeKind::Property { target: Record::Node(node), .. }) => {
                let current = evt.model.node(&node.key).unwrap_or(node);
                ChangeEvent::grouped(current.clone(), evt.model.snapshot())
            }
            _ => return false,
        };
        tracing::trace!(%event, "change translated");
        sink.notify(event);
        true
    }
}

/// Offer a raw change to every handler
///
/// Returns the number of events forwarded to the sink.
pub fn dispatch(
    evt: &ChangedEvent<'_>,
    ctx: &HandlerContext<'_>,
    sink: &mut dyn NotificationSink,
) -> usize {
    let mut forwarded = 0;
    for handler in ChangeHandler::ALL {
        if handler.can_handle(evt.change, ctx) && handler.handle(evt, ctx, sink) {
            forwarded += 1;
        }
    }
    forwarded
}
