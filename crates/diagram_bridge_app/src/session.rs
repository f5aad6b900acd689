// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host's side of the synchronization loop.
//!
//! A [`Session`] owns the declarative model, just as a UI application
//! would own its state. Change events from the component are queued by the
//! callback, applied to that model once the interaction's transaction has
//! committed, and the new model is handed back to the component.

use crate::commands::Command;
use crate::document::DiagramDocument;
use crate::error::{AppError, Result};
use diagram_bridge::{
    ChangeEvent, ChangeEventKind, ContainerSize, DiagramComponent, DiagramProps, EventSubject,
    MountState, ReconcileStats, POLL_INTERVAL,
};
use diagram_bridge_graph::{
    DiagramEngine, DiagramModel, GraphModelEngine, Key, LinkIdentity, ModelHooks, NodeData,
};
use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;

/// Element id of the diagram container
pub const DIAGRAM_ID: &str = "diagram";

/// CSS class of the diagram container
pub const DIAGRAM_CLASS: &str = "diagram-component";

/// Layout samples taken before giving up on mounting
const MAX_LAYOUT_SAMPLES: usize = 20;

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Change events applied to the declarative model
    Applied(usize),
    /// Text to show
    Summary(String),
    /// Document written
    Saved(PathBuf),
    /// The host should stop
    Quit,
}

/// Apply one change event to a declarative model
pub fn apply_change(model: &mut DiagramModel, identity: &LinkIdentity, event: &ChangeEvent) {
    match (event.kind, &event.subject) {
        (ChangeEventKind::Add, EventSubject::Node(node)) => {
            if !model.contains_node(&node.key) {
                model.nodes.push(node.clone());
            }
        }
        (ChangeEventKind::Add, EventSubject::Link(link)) => {
            if !model.links.iter().any(|l| identity.matches(l, link)) {
                model.links.push(link.clone());
            }
        }
        (ChangeEventKind::Remove, EventSubject::Node(node)) => {
            model.nodes.retain(|n| n.key != node.key);
        }
        (ChangeEventKind::Remove, EventSubject::Link(link)) => {
            model.links.retain(|l| !identity.matches(l, link));
        }
        (ChangeEventKind::Group, EventSubject::Node(node)) => {
            if let Some(existing) = model.nodes.iter_mut().find(|n| n.key == node.key) {
                *existing = node.clone();
            }
        }
        (ChangeEventKind::Group, EventSubject::Link(_)) => {
            tracing::warn!(%event, "group event for a link ignored");
        }
    }
}

/// Node keys for inserted or copied nodes that collide
fn host_hooks() -> ModelHooks {
    let counter = Rc::new(Cell::new(0u32));
    ModelHooks::default().with_node_keys(move |node: &NodeData| {
        counter.set(counter.get() + 1);
        let stem = if node.key.is_empty() { "node" } else { node.key.as_str() };
        format!("{stem}-{}", counter.get())
    })
}

/// A mounted diagram and the model it mirrors
pub struct Session {
    component: DiagramComponent<GraphModelEngine>,
    model: DiagramModel,
    identity: LinkIdentity,
    inbox: Rc<RefCell<Vec<ChangeEvent>>>,
    path: PathBuf,
    selected: Option<Key>,
}

impl Session {
    /// Create an unmounted session for a document stored at `path`
    pub fn new(document: DiagramDocument, path: impl Into<PathBuf>) -> Self {
        let inbox: Rc<RefCell<Vec<ChangeEvent>>> = Rc::default();
        let queue = Rc::clone(&inbox);
        let identity = document.config.link_identity();

        let mut props = DiagramProps::new(DIAGRAM_ID, document.model.clone(), |id: &str| {
            Ok(GraphModelEngine::new(id))
        })
        .with_class_name(DIAGRAM_CLASS)
        .with_config(document.config)
        .with_hooks(host_hooks())
        .on_model_change(move |event| queue.borrow_mut().push(event));
        if let Some(selected) = document.selected.clone() {
            props = props.with_selected(selected);
        }

        Self {
            component: DiagramComponent::new(props),
            model: document.model,
            identity,
            inbox,
            path: path.into(),
            selected: document.selected,
        }
    }

    /// Mount once the container reports the same size twice
    pub fn mount(&mut self, container: ContainerSize) -> Result<()> {
        let element = self.component.render();
        tracing::debug!(id = %element.id, class = %element.class_name, "rendering container");
        self.component.mount_when_sized()?;
        for _ in 0..MAX_LAYOUT_SAMPLES {
            if self.component.poll_layout(container)? == MountState::Mounted {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.component.unmount();
        Err(AppError::Layout {
            width: container.width,
            height: container.height,
        })
    }

    /// Run one command
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Show => Ok(Reply::Summary(self.summary())),
            Command::Save { path } => {
                let path = path.unwrap_or_else(|| self.path.clone());
                self.document().save(&path)?;
                Ok(Reply::Saved(path))
            }
            Command::Quit => Ok(Reply::Quit),
            command => {
                let config = self.component.config().clone();
                self.component
                    .run_transaction(command.name(), |engine| command.apply(engine, &config))?;
                Ok(Reply::Applied(self.sync()?))
            }
        }
    }

    /// Apply queued change events and reconcile with the result
    fn sync(&mut self) -> Result<usize> {
        let events = std::mem::take(&mut *self.inbox.borrow_mut());
        if events.is_empty() {
            return Ok(0);
        }
        for event in &events {
            tracing::info!(%event, "applying change");
            apply_change(&mut self.model, &self.identity, event);
        }
        let stats = self.component.update(self.model.clone())?;
        if !stats.is_empty() {
            tracing::warn!(?stats, "model and engine disagreed after applying changes");
        }
        Ok(events.len())
    }

    /// Replace the declarative model with a reloaded document's
    pub fn reload(&mut self, document: DiagramDocument) -> Result<ReconcileStats> {
        if document.config != *self.component.config() {
            tracing::warn!("document configuration changed; restart to apply it");
        }
        self.model = document.model;
        self.selected = document.selected;
        let stats = self.component.update(self.model.clone())?;
        tracing::info!(ops = stats.structural_ops(), "document reloaded");
        Ok(stats)
    }

    /// The declarative model as a document
    pub fn document(&self) -> DiagramDocument {
        DiagramDocument {
            config: self.component.config().clone(),
            model: self.model.clone(),
            selected: self
                .selected
                .clone()
                .filter(|key| self.model.contains_node(key)),
        }
    }

    /// Human-readable listing of the engine contents
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let Some(engine) = self.engine() else {
            out.push_str("(not mounted)\n");
            return out;
        };
        let _ = writeln!(
            out,
            "{} nodes, {} links",
            engine.node_data().len(),
            engine.link_data().len()
        );
        for node in engine.node_data() {
            let fields = serde_json::Value::Object(node.fields.clone());
            let _ = writeln!(out, "  {} {}", node.key, fields);
        }
        for link in engine.link_data() {
            let _ = writeln!(out, "  {} -> {}", link.from, link.to);
        }
        let selected: Vec<_> = engine.selection().collect();
        if !selected.is_empty() {
            let _ = writeln!(out, "selected: {}", selected.join(", "));
        }
        out
    }

    /// The declarative model
    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    /// The mounted engine
    pub fn engine(&self) -> Option<&GraphModelEngine> {
        self.component.engine()
    }

    /// Document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tear the component down
    pub fn unmount(&mut self) {
        self.component.unmount();
    }
}
