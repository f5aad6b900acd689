// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by the synchronization driver.

use diagram_bridge_graph::EngineError;
use thiserror::Error;

/// Synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// The engine has not been created yet
    #[error("Diagram is not mounted")]
    NotMounted,

    /// Mount was requested twice
    #[error("Diagram is already mounted")]
    AlreadyMounted,

    /// The component was torn down
    #[error("Diagram was unmounted")]
    Unmounted,

    /// The engine refused an operation
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
