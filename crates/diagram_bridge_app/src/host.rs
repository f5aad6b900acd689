// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host event loop.
//!
//! Stdin lines and document changes arrive on one channel and are handled
//! on the thread that owns the session.

use crate::args::Args;
use crate::commands::Command;
use crate::document::DiagramDocument;
use crate::error::Result;
use crate::file_watcher::DocumentWatcher;
use crate::session::{Reply, Session};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;

/// Input to the host loop
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A line typed on stdin
    Line(String),
    /// The document was edited on disk
    DocumentChanged(PathBuf),
    /// The watcher reported an error
    WatchError(String),
    /// Stdin was closed
    InputClosed,
}

/// Forward stdin lines to the host loop
fn spawn_input_reader(events: Sender<HostEvent>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if events.send(HostEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {e}");
                    break;
                }
            }
        }
        let _ = events.send(HostEvent::InputClosed);
    });
}

/// Load, mount and serve until `quit` or end of input
pub fn run(args: &Args) -> Result<()> {
    let document = DiagramDocument::load(&args.model)?;
    let mut session = Session::new(document, &args.model);
    session.mount(args.viewport)?;
    tracing::info!(path = %session.path().display(), "diagram ready");

    let (tx, rx) = mpsc::channel();
    let _watcher = if args.watch {
        Some(DocumentWatcher::new(&args.model, tx.clone())?)
    } else {
        None
    };
    spawn_input_reader(tx);

    for event in rx {
        if !handle(&mut session, event) {
            break;
        }
    }

    session.unmount();
    Ok(())
}

/// Handle one event; returns whether to keep going
fn handle(session: &mut Session, event: HostEvent) -> bool {
    match event {
        HostEvent::Line(line) => {
            if line.trim().is_empty() {
                return true;
            }
            let reply = line
                .parse::<Command>()
                .and_then(|command| session.execute(command));
            match reply {
                Ok(Reply::Quit) => return false,
                Ok(Reply::Summary(text)) => print!("{text}"),
                Ok(Reply::Saved(path)) => println!("saved {}", path.display()),
                Ok(Reply::Applied(count)) => {
                    tracing::debug!(count, nodes = session.model().nodes.len(), "interaction applied");
                }
                Err(e) => tracing::error!("{e}"),
            }
        }
        HostEvent::DocumentChanged(path) => match DiagramDocument::load(&path) {
            Ok(document) => {
                if let Err(e) = session.reload(document) {
                    tracing::error!("Reload failed: {e}");
                }
            }
            Err(e) => tracing::warn!("Ignoring unreadable document: {e}"),
        },
        HostEvent::WatchError(message) => tracing::warn!("File watcher error: {message}"),
        HostEvent::InputClosed => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_bridge::ContainerSize;
    use diagram_bridge_graph::{DiagramModel, NodeData};

    fn session() -> Session {
        let document = DiagramDocument {
            model: DiagramModel::new(vec![NodeData::new("a")], vec![]),
            ..Default::default()
        };
        let mut session = Session::new(document, "unused.json");
        session.mount(ContainerSize::new(100.0, 100.0)).unwrap();
        session
    }

    #[test]
    fn test_handle_lines() {
        let mut session = session();
        assert!(handle(&mut session, HostEvent::Line("   ".into())));
        assert!(handle(&mut session, HostEvent::Line("add b".into())));
        assert!(handle(&mut session, HostEvent::Line("nonsense".into())));
        assert!(session.model().contains_node("b"));
        assert!(!handle(&mut session, HostEvent::Line("quit".into())));
        assert!(!handle(&mut session, HostEvent::InputClosed));
    }

    #[test]
    fn test_handle_document_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edited.json");
        let edited = DiagramDocument {
            model: DiagramModel::new(vec![NodeData::new("a"), NodeData::new("c")], vec![]),
            ..Default::default()
        };
        edited.save(&path).unwrap();

        let mut session = session();
        assert!(handle(&mut session, HostEvent::DocumentChanged(path)));
        assert!(session.model().contains_node("c"));
        assert_eq!(session.engine().unwrap().parts().node_count(), 2);

        let missing = dir.path().join("gone.json");
        assert!(handle(&mut session, HostEvent::DocumentChanged(missing)));
        assert!(handle(&mut session, HostEvent::WatchError("boom".into())));
    }
}
