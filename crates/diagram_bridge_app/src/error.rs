// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host errors.

use diagram_bridge::SyncError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the console host
#[derive(Debug, Error)]
pub enum AppError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON document
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// Malformed JSON document or field value
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File watcher error
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Document extension is neither `.ron` nor `.json`
    #[error("Unsupported document format: {}", .0.display())]
    Format(PathBuf),

    /// A command line could not be parsed
    #[error("Invalid command: {0}")]
    Parse(String),

    /// The container never reported a stable size
    #[error("Container never settled at {width}x{height}")]
    Layout {
        /// Sampled width
        width: f32,
        /// Sampled height
        height: f32,
    },

    /// Synchronization failed
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, AppError>;
