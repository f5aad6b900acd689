// SPDX-License-Identifier: MIT OR Apache-2.0
//! File system watcher for the loaded document.
//!
//! Provides debounced change notifications so out-of-band edits to the
//! document can be reloaded into the running component.

use crate::host::HostEvent;
use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecommendedWatcher, RecursiveMode},
    DebounceEventResult, Debouncer, RecommendedCache,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Debounce window for document edits
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches one document file
pub struct DocumentWatcher {
    /// The underlying debounced watcher
    _watcher: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl DocumentWatcher {
    /// Watch `path`, reporting edits on `events`
    ///
    /// The parent directory is watched rather than the file, so editors
    /// that save by replacing the file are still noticed.
    pub fn new(path: &Path, events: Sender<HostEvent>) -> Result<Self, notify::Error> {
        let path = path.to_path_buf();
        let file_name = path.file_name().map(OsString::from);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let target = path.clone();
        let mut watcher = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(batch) => {
                    let touched = batch.iter().any(|event| {
                        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                            && event
                                .paths
                                .iter()
                                .any(|p| p.file_name() == file_name.as_deref())
                    });
                    if touched {
                        let _ = events.send(HostEvent::DocumentChanged(target.clone()));
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = events.send(HostEvent::WatchError(error.to_string()));
                    }
                }
            }
        })?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching document for changes: {:?}", path);
        Ok(Self { _watcher: watcher })
    }
}
