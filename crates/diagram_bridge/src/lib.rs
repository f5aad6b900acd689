// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keeps a stateful diagram engine in sync with a declarative model.
//!
//! This crate provides the synchronization core:
//! - Reconciliation of engine data against the caller's model
//! - Translation of raw engine changes into caller-facing events
//! - Per-transaction batching of those events
//! - Deferred mounting until the host container has a size
//!
//! ## Architecture
//!
//! The caller owns the model and hands a new one to
//! [`DiagramComponent::update`] whenever it changes. The component diffs it
//! against the engine and issues only the structural operations needed,
//! inside one transaction. Changes made in the engine by the user flow back
//! the other way: every raw change is offered to each [`ChangeHandler`],
//! whose guards drop anything the caller's model already reflects, and the
//! [`NotificationDelegate`] delivers what is left when the transaction
//! commits.

pub mod component;
pub mod delegate;
pub mod error;
pub mod event;
pub mod handler;
pub mod layout;
pub mod reconcile;

pub use component::{
    ContainerElement, DiagramComponent, DiagramProps, EngineFactory, EngineHook, MountState,
    UPDATE_TRANSACTION,
};
pub use delegate::{ChangeCallback, DelegateState, NotificationDelegate};
pub use error::{Result, SyncError};
pub use event::{ChangeEvent, ChangeEventKind, EventSubject};
pub use handler::{dispatch, ChangeHandler, HandlerContext, NotificationSink};
pub use layout::{ContainerSize, LayoutProbe, ProbeStatus, POLL_INTERVAL};
pub use reconcile::{diff_links, diff_nodes, LinkDiff, NodeDiff, ReconcileStats};
