// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-transaction batching of change events.

use crate::event::ChangeEvent;
use crate::handler::{dispatch, HandlerContext, NotificationSink};
use diagram_bridge_graph::{ChangeKind, ChangedEvent, TransactionPhase};
use std::fmt;

/// Caller callback receiving change events
pub type ChangeCallback = Box<dyn FnMut(ChangeEvent)>;

/// Where the delegate is in the transaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelegateState {
    /// No transaction open
    #[default]
    Idle,
    /// Collecting events of an open transaction
    Buffering,
    /// Delivering a committed transaction's events
    Flushing,
}

/// Buffers change events during a transaction and delivers them on commit
pub struct NotificationDelegate {
    state: DelegateState,
    buffer: Vec<ChangeEvent>,
    callback: ChangeCallback,
}

impl NotificationDelegate {
    /// Create a delegate delivering to `callback`
    pub fn new(callback: impl FnMut(ChangeEvent) + 'static) -> Self {
        Self::from_boxed(Box::new(callback))
    }

    /// Create a delegate from an already boxed callback
    pub fn from_boxed(callback: ChangeCallback) -> Self {
        Self {
            state: DelegateState::Idle,
            buffer: Vec::new(),
            callback,
        }
    }

    /// Current state
    pub fn state(&self) -> DelegateState {
        self.state
    }

    /// Number of buffered events
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Observe one raw engine change
    pub fn on_changed(&mut self, evt: &ChangedEvent<'_>, ctx: &HandlerContext<'_>) {
        match evt.change {
            ChangeKind::Transaction { phase, name } => match phase {
                TransactionPhase::Started => self.begin(name),
                TransactionPhase::Committed => self.flush(name),
                TransactionPhase::RolledBack => self.discard(name),
            },
            _ => {
                dispatch(evt, ctx, self);
            }
        }
    }

    fn begin(&mut self, name: &str) {
        if !self.buffer.is_empty() {
            tracing::debug!(name, stale = self.buffer.len(), "discarding stale change events");
            self.buffer.clear();
        }
        self.state = DelegateState::Buffering;
    }

    fn flush(&mut self, name: &str) {
        self.state = DelegateState::Flushing;
        // Drained up front: a callback that panics loses the rest of the batch
        let events = std::mem::take(&mut self.buffer);
        if !events.is_empty() {
            tracing::debug!(name, count = events.len(), "delivering change events");
        }
        for event in events {
            (self.callback)(event);
        }
        self.state = DelegateState::Idle;
    }

    fn discard(&mut self, name: &str) {
        if !self.buffer.is_empty() {
            tracing::debug!(name, count = self.buffer.len(), "transaction rolled back, dropping change events");
        }
        self.buffer.clear();
        self.state = DelegateState::Idle;
    }
}

impl NotificationSink for NotificationDelegate {
    fn notify(&mut self, event: ChangeEvent) {
        match self.state {
            DelegateState::Buffering => self.buffer.push(event),
            DelegateState::Idle | DelegateState::Flushing => {
                tracing::warn!(%event, "change outside a transaction dropped");
            }
        }
    }
}

impl fmt::Debug for NotificationDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDelegate")
            .field("state", &self.state)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeEventKind;
    use diagram_bridge_graph::{Collection, DiagramModel, LinkIdentity, NodeData, Record};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        delegate: NotificationDelegate,
        delivered: Rc<RefCell<Vec<ChangeEvent>>>,
        declarative: DiagramModel,
        identity: LinkIdentity,
        engine_side: DiagramModel,
    }

    impl Harness {
        fn new() -> Self {
            let delivered = Rc::new(RefCell::new(Vec::new()));
            let sink = delivered.clone();
            Self {
                delegate: NotificationDelegate::new(move |event| sink.borrow_mut().push(event)),
                delivered,
                declarative: DiagramModel::default(),
                identity: LinkIdentity::endpoints(),
                engine_side: DiagramModel::default(),
            }
        }

        fn feed(&mut self, change: ChangeKind) {
            let evt = ChangedEvent {
                change: &change,
                model: self.engine_side.view(),
            };
            let ctx = HandlerContext {
                declarative: &self.declarative,
                identity: &self.identity,
                group_property: "group",
            };
            self.delegate.on_changed(&evt, &ctx);
        }

        fn marker(&mut self, phase: TransactionPhase) {
            self.feed(ChangeKind::Transaction {
                phase,
                name: "test".into(),
            });
        }

        fn insert(&mut self, key: &str) {
            self.feed(ChangeKind::Insert {
                collection: Collection::Nodes,
                value: Record::Node(NodeData::new(key)),
            });
        }
    }

    #[test]
    fn test_flush_on_commit_in_order() {
        let mut harness = Harness::new();
        harness.marker(TransactionPhase::Started);
        harness.insert("b");
        harness.insert("a");
        assert_eq!(harness.delegate.state(), DelegateState::Buffering);
        assert_eq!(harness.delegate.pending(), 2);
        assert!(harness.delivered.borrow().is_empty());

        harness.marker(TransactionPhase::Committed);
        let delivered = harness.delivered.borrow();
        let keys: Vec<_> = delivered
            .iter()
            .map(|e| e.node_data().unwrap().key.as_str())
            .collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(delivered.iter().all(|e| e.kind == ChangeEventKind::Add));
        assert_eq!(harness.delegate.state(), DelegateState::Idle);
        assert_eq!(harness.delegate.pending(), 0);
    }

    #[test]
    fn test_empty_transaction_calls_nothing() {
        let mut harness = Harness::new();
        harness.marker(TransactionPhase::Started);
        harness.marker(TransactionPhase::Committed);
        assert!(harness.delivered.borrow().is_empty());
    }

    #[test]
    fn test_rollback_discards() {
        let mut harness = Harness::new();
        harness.marker(TransactionPhase::Started);
        harness.insert("a");
        harness.marker(TransactionPhase::RolledBack);
        harness.marker(TransactionPhase::Started);
        harness.marker(TransactionPhase::Committed);
        assert!(harness.delivered.borrow().is_empty());
    }

    #[test]
    fn test_restart_clears_stale_events() {
        let mut harness = Harness::new();
        harness.marker(TransactionPhase::Started);
        harness.insert("stale");
        harness.marker(TransactionPhase::Started);
        harness.insert("fresh");
        harness.marker(TransactionPhase::Committed);

        let delivered = harness.delivered.borrow();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].node_data().unwrap().key, "fresh");
    }

    #[test]
    fn test_idle_events_dropped() {
        let mut harness = Harness::new();
        harness.insert("a");
        assert_eq!(harness.delegate.pending(), 0);
        harness.marker(TransactionPhase::Committed);
        assert!(harness.delivered.borrow().is_empty());
    }

    #[test]
    fn test_panicking_callback_loses_rest_of_batch() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut harness = Harness::new();
        harness.delegate = NotificationDelegate::new(move |_| {
            *counter.borrow_mut() += 1;
            panic!("callback failed");
        });
        harness.marker(TransactionPhase::Started);
        harness.insert("a");
        harness.insert("b");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            harness.marker(TransactionPhase::Committed);
        }));
        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(harness.delegate.pending(), 0);

        // The next transaction starts clean
        harness.marker(TransactionPhase::Started);
        assert_eq!(harness.delegate.state(), DelegateState::Buffering);
    }
}
