// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transaction bookkeeping for the headless engine.

use crate::model::DiagramModel;
use std::collections::VecDeque;

/// Maximum number of committed transactions kept in the log
const MAX_LOG: usize = 100;

/// Unique transaction ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A committed transaction
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// Transaction ID
    pub id: TransactionId,
    /// Name passed to commit
    pub name: String,
    /// Number of changes raised inside the transaction
    pub changes: usize,
    /// Whether the engine opened the transaction on its own
    pub implicit: bool,
}

/// The transaction currently open
#[derive(Debug)]
pub(crate) struct OpenTransaction {
    pub(crate) id: TransactionId,
    pub(crate) name: String,
    pub(crate) depth: usize,
    pub(crate) changes: usize,
    pub(crate) implicit: bool,
    /// Data arrays at the outermost start, restored on rollback
    pub(crate) snapshot: DiagramModel,
}

/// Bounded log of committed transactions
#[derive(Debug)]
pub struct TransactionLog {
    entries: VecDeque<TransactionRecord>,
    next_id: u64,
    max_depth: usize,
}

impl TransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::with_max_depth(MAX_LOG)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            max_depth,
        }
    }

    pub(crate) fn open(&mut self, name: &str, implicit: bool, snapshot: DiagramModel) -> OpenTransaction {
        let id = TransactionId(self.next_id);
        self.next_id += 1;
        OpenTransaction {
            id,
            name: name.to_string(),
            depth: 1,
            changes: 0,
            implicit,
            snapshot,
        }
    }

    pub(crate) fn record(&mut self, open: OpenTransaction, name: &str) {
        self.entries.push_back(TransactionRecord {
            id: open.id,
            name: name.to_string(),
            changes: open.changes,
            implicit: open.implicit,
        });
        while self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
    }

    /// Committed transactions, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.entries.iter()
    }

    /// The most recent committed transaction
    pub fn last(&self) -> Option<&TransactionRecord> {
        self.entries.back()
    }

    /// Number of logged transactions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was logged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}
