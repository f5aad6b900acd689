// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model and engine boundary for `diagram_bridge`.
//!
//! This crate holds everything on the engine side of the synchronization
//! protocol:
//! - Node and link records, the diagram model aggregate
//! - Link identity and model configuration
//! - Raw change events and the [`DiagramEngine`] trait
//! - [`GraphModelEngine`], a headless engine implementing the trait
//!
//! ## Architecture
//!
//! An engine owns copies of the records it is given. Every mutation is
//! reported synchronously to registered listeners as a [`ChangeKind`],
//! bracketed by transaction markers. Parts (resolved endpoints, group
//! membership, bindings, selection) are derived from data and rebuilt
//! when a transaction commits.

pub mod change;
pub mod config;
pub mod engine;
pub mod graph;
pub mod link;
pub mod model;
pub mod node;
pub mod part;
pub mod transaction;

pub use change::{
    ChangeKind, ChangedEvent, ChangedListener, Collection, DataRef, ListenerId, Record,
    TransactionPhase,
};
pub use config::{ModelConfig, ModelHooks};
pub use engine::{DiagramEngine, EngineError};
pub use graph::GraphModelEngine;
pub use link::{LinkData, LinkIdentity, LinkIndex};
pub use model::{DiagramModel, ModelRef};
pub use node::{Fields, Key, NodeData};
pub use part::{LinkPart, NodePart, PartTable};
pub use transaction::{TransactionLog, TransactionRecord};
