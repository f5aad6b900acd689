// SPDX-License-Identifier: MIT OR Apache-2.0
//! The component that keeps one engine in sync with a declarative model.
//!
//! Lifecycle: `new` -> `render` -> `mount` (or `mount_when_sized` plus
//! `poll_layout`) -> any number of `update`s -> `unmount`. Every update
//! reconciles inside a single engine transaction; the engine's change feed
//! drives the [`NotificationDelegate`], which hands caller-facing events to
//! the callback when that transaction commits.

use crate::delegate::{ChangeCallback, NotificationDelegate};
use crate::error::{Result, SyncError};
use crate::event::ChangeEvent;
use crate::handler::HandlerContext;
use crate::layout::{ContainerSize, LayoutProbe, ProbeStatus};
use crate::reconcile::{diff_links, diff_nodes, ReconcileStats};
use diagram_bridge_graph::{
    ChangedEvent, DiagramEngine, DiagramModel, EngineError, Key, LinkIdentity, ListenerId,
    ModelConfig, ModelHooks,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Name of the transaction every update runs in
pub const UPDATE_TRANSACTION: &str = "updated";

/// Creates the engine for a container id
pub type EngineFactory<E> = Box<dyn FnOnce(&str) -> std::result::Result<E, EngineError>>;

/// Adjusts engine-level properties after reconciliation
pub type EngineHook<E> = Box<dyn FnMut(&mut E)>;

/// Everything the caller supplies to a [`DiagramComponent`]
pub struct DiagramProps<E> {
    diagram_id: String,
    class_name: String,
    model: Rc<DiagramModel>,
    factory: EngineFactory<E>,
    on_model_change: Option<ChangeCallback>,
    config: ModelConfig,
    hooks: ModelHooks,
    update_hook: Option<EngineHook<E>>,
    selected: Option<Key>,
}

impl<E> DiagramProps<E> {
    /// Create props for a container, an initial model and an engine factory
    pub fn new(
        diagram_id: impl Into<String>,
        model: impl Into<Rc<DiagramModel>>,
        factory: impl FnOnce(&str) -> std::result::Result<E, EngineError> + 'static,
    ) -> Self {
        Self {
            diagram_id: diagram_id.into(),
            class_name: String::new(),
            model: model.into(),
            factory: Box::new(factory),
            on_model_change: None,
            config: ModelConfig::default(),
            hooks: ModelHooks::default(),
            update_hook: None,
            selected: None,
        }
    }

    /// Set the CSS class of the container
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Receive change events made in the engine
    pub fn on_model_change(mut self, callback: impl FnMut(ChangeEvent) + 'static) -> Self {
        self.on_model_change = Some(Box::new(callback));
        self
    }

    /// Set the model configuration
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the key and copy hooks
    pub fn with_hooks(mut self, hooks: ModelHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Run `hook` on the engine at the end of every update
    pub fn with_update_hook(mut self, hook: impl FnMut(&mut E) + 'static) -> Self {
        self.update_hook = Some(Box::new(hook));
        self
    }

    /// Select a node once mounted
    pub fn with_selected(mut self, key: impl Into<Key>) -> Self {
        self.selected = Some(key.into());
        self
    }
}

/// The element a host renders for the engine to attach to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerElement {
    /// Element id, passed to the engine factory
    pub id: String,
    /// CSS class
    pub class_name: String,
}

/// Lifecycle state of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Constructed, not mounted
    Created,
    /// Waiting for the container to have a stable size
    AwaitingLayout,
    /// Engine created and loaded
    Mounted,
    /// Torn down
    Unmounted,
}

/// State the engine listener shares with the component
struct ListenerState {
    declarative: Rc<DiagramModel>,
    identity: LinkIdentity,
    group_property: String,
    delegate: NotificationDelegate,
}

/// Keeps one diagram engine structurally equal to a declarative model
pub struct DiagramComponent<E: DiagramEngine> {
    diagram_id: String,
    class_name: String,
    model: Rc<DiagramModel>,
    factory: Option<EngineFactory<E>>,
    config: ModelConfig,
    hooks: ModelHooks,
    update_hook: Option<EngineHook<E>>,
    selected: Option<Key>,
    identity: LinkIdentity,
    shared: Option<Rc<RefCell<ListenerState>>>,
    engine: Option<E>,
    listener: Option<ListenerId>,
    probe: Option<LayoutProbe>,
    state: MountState,
}

impl<E: DiagramEngine> DiagramComponent<E> {
    /// Create an unmounted component
    pub fn new(props: DiagramProps<E>) -> Self {
        let identity = props.config.link_identity();
        let shared = props.on_model_change.map(|callback| {
            Rc::new(RefCell::new(ListenerState {
                declarative: Rc::clone(&props.model),
                identity: identity.clone(),
                group_property: props.config.node_group_property.clone(),
                delegate: NotificationDelegate::from_boxed(callback),
            }))
        });
        Self {
            diagram_id: props.diagram_id,
            class_name: props.class_name,
            model: props.model,
            factory: Some(props.factory),
            config: props.config,
            hooks: props.hooks,
            update_hook: props.update_hook,
            selected: props.selected,
            identity,
            shared,
            engine: None,
            listener: None,
            probe: None,
            state: MountState::Created,
        }
    }

    /// The container element to render
    pub fn render(&self) -> ContainerElement {
        ContainerElement {
            id: self.diagram_id.clone(),
            class_name: self.class_name.clone(),
        }
    }

    /// Create the engine and load the current model
    pub fn mount(&mut self) -> Result<()> {
        match self.state {
            MountState::Created | MountState::AwaitingLayout => {}
            MountState::Mounted => return Err(SyncError::AlreadyMounted),
            MountState::Unmounted => return Err(SyncError::Unmounted),
        }
        let factory = self.factory.take().ok_or(SyncError::AlreadyMounted)?;
        let mut engine = factory(&self.diagram_id)?;

        if let Some(shared) = &self.shared {
            let shared = Rc::clone(shared);
            let id = engine.add_changed_listener(Box::new(move |evt: &ChangedEvent<'_>| {
                let mut guard = shared.borrow_mut();
                let state = &mut *guard;
                let ctx = HandlerContext {
                    declarative: &state.declarative,
                    identity: &state.identity,
                    group_property: &state.group_property,
                };
                state.delegate.on_changed(evt, &ctx);
            }));
            self.listener = Some(id);
        }

        engine.load_model(
            DiagramModel::clone(&self.model),
            self.config.clone(),
            self.hooks.clone(),
        );
        if let Some(key) = &self.selected {
            if !engine.select(key) {
                tracing::debug!(%key, "selected node not in model");
            }
        }

        tracing::debug!(
            id = %self.diagram_id,
            nodes = engine.node_data().len(),
            links = engine.link_data().len(),
            listening = self.listener.is_some(),
            "diagram mounted"
        );
        self.engine = Some(engine);
        self.probe = None;
        self.state = MountState::Mounted;
        Ok(())
    }

    /// Defer mounting until the container has a stable, non-empty size
    ///
    /// The host then samples the container every
    /// [`POLL_INTERVAL`](crate::layout::POLL_INTERVAL) and passes each
    /// sample to [`poll_layout`](Self::poll_layout).
    pub fn mount_when_sized(&mut self) -> Result<()> {
        match self.state {
            MountState::Created => {
                self.probe = Some(LayoutProbe::new());
                self.state = MountState::AwaitingLayout;
                Ok(())
            }
            MountState::AwaitingLayout => Ok(()),
            MountState::Mounted => Err(SyncError::AlreadyMounted),
            MountState::Unmounted => Err(SyncError::Unmounted),
        }
    }

    /// Feed one container size sample, mounting once it is stable
    pub fn poll_layout(&mut self, size: ContainerSize) -> Result<MountState> {
        if self.state != MountState::AwaitingLayout {
            return Ok(self.state);
        }
        let Some(probe) = self.probe.as_mut() else {
            return Ok(self.state);
        };
        match probe.sample(size) {
            ProbeStatus::Stable(size) => {
                tracing::debug!(width = size.width, height = size.height, "container stable");
                self.mount()?;
            }
            ProbeStatus::Waiting | ProbeStatus::Cancelled => {}
        }
        Ok(self.state)
    }

    /// Reconcile the engine against a new declarative model
    ///
    /// Supplying the model currently held (the same `Rc`) does nothing.
    pub fn update(&mut self, model: impl Into<Rc<DiagramModel>>) -> Result<ReconcileStats> {
        let model = model.into();
        if self.state == MountState::Unmounted {
            return Err(SyncError::Unmounted);
        }
        if Rc::ptr_eq(&model, &self.model) {
            tracing::trace!("same model, skipping reconciliation");
            return Ok(ReconcileStats::default());
        }

        // Guards must see the new model before the engine reports anything
        self.model = model;
        if let Some(shared) = &self.shared {
            shared.borrow_mut().declarative = Rc::clone(&self.model);
        }

        if self.state != MountState::Mounted {
            tracing::debug!("model updated before mount");
            return Ok(ReconcileStats::default());
        }
        self.reconcile()
    }

    fn reconcile(&mut self) -> Result<ReconcileStats> {
        let engine = self.engine.as_mut().ok_or(SyncError::NotMounted)?;
        let model = &self.model;
        let mut stats = ReconcileStats::default();

        engine.start_transaction(UPDATE_TRANSACTION)?;

        let links = diff_links(&model.links, engine.link_data(), &self.identity);
        stats.links_removed = links.to_remove.len();
        stats.links_added = links.to_add.len();
        engine.remove_link_data_collection(&links.to_remove);
        engine.add_link_data_collection(links.to_add);

        let nodes = diff_nodes(&model.nodes, engine.node_data());
        stats.nodes_removed = nodes.to_remove.len();
        stats.nodes_added = nodes.to_add.len();
        engine.remove_node_data_collection(&nodes.to_remove);
        engine.add_node_data_collection(nodes.to_add);

        engine.merge_node_data(&model.nodes);
        engine.merge_link_data(&model.links);

        if let Some(hook) = self.update_hook.as_mut() {
            hook(&mut *engine);
        }
        engine.update_all_relationships_from_data();
        engine.update_all_target_bindings();
        engine.commit_transaction(UPDATE_TRANSACTION)?;

        tracing::debug!(
            links_added = stats.links_added,
            links_removed = stats.links_removed,
            nodes_added = stats.nodes_added,
            nodes_removed = stats.nodes_removed,
            "diagram reconciled"
        );
        Ok(stats)
    }

    /// Run a user interaction against the engine as one transaction
    ///
    /// If `f` fails the transaction is rolled back and nothing is delivered.
    pub fn run_transaction<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut E) -> std::result::Result<T, EngineError>,
    ) -> Result<T> {
        let engine = match self.state {
            MountState::Mounted => self.engine.as_mut().ok_or(SyncError::NotMounted)?,
            MountState::Unmounted => return Err(SyncError::Unmounted),
            MountState::Created | MountState::AwaitingLayout => {
                return Err(SyncError::NotMounted)
            }
        };
        engine.start_transaction(name)?;
        match f(&mut *engine) {
            Ok(out) => {
                engine.commit_transaction(name)?;
                Ok(out)
            }
            Err(err) => {
                tracing::debug!(name, %err, "interaction failed, rolling back");
                engine.rollback_transaction()?;
                Err(err.into())
            }
        }
    }

    /// Tear down: detach the listener, then empty the engine
    ///
    /// Nothing is delivered to the callback from here on. Calling this
    /// more than once is harmless.
    pub fn unmount(&mut self) {
        if let Some(probe) = self.probe.as_mut() {
            probe.cancel();
        }
        self.probe = None;
        if let Some(engine) = self.engine.as_mut() {
            if let Some(id) = self.listener.take() {
                engine.remove_changed_listener(id);
            }
            engine.clear();
        }
        if self.state != MountState::Unmounted {
            tracing::debug!(id = %self.diagram_id, "diagram unmounted");
        }
        self.state = MountState::Unmounted;
    }

    /// The engine, once mounted
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Mutable access to the engine, once mounted
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// The declarative model of the most recent update
    pub fn model(&self) -> &Rc<DiagramModel> {
        &self.model
    }

    /// Model configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Lifecycle state
    pub fn state(&self) -> MountState {
        self.state
    }
}

impl<E: DiagramEngine> Drop for DiagramComponent<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<E: DiagramEngine> fmt::Debug for DiagramComponent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramComponent")
            .field("diagram_id", &self.diagram_id)
            .field("state", &self.state)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeEventKind;
    use diagram_bridge_graph::{GraphModelEngine, LinkData, NodeData};
    use serde_json::json;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    type Events = Rc<RefCell<Vec<ChangeEvent>>>;

    fn scenario_model() -> DiagramModel {
        DiagramModel::new(
            ["Alpha", "Beta", "Gamma", "Delta", "Omega"]
                .into_iter()
                .map(NodeData::new)
                .collect(),
            vec![
                LinkData::new("Alpha", "Beta"),
                LinkData::new("Alpha", "Gamma"),
                LinkData::new("Beta", "Delta"),
                LinkData::new("Gamma", "Omega"),
            ],
        )
    }

    fn props(model: DiagramModel, events: &Events) -> DiagramProps<GraphModelEngine> {
        let sink = Rc::clone(events);
        DiagramProps::new("myDiagramDiv", model, |id: &str| Ok(GraphModelEngine::new(id)))
            .with_class_name("myDiagram")
            .on_model_change(move |event| sink.borrow_mut().push(event))
    }

    fn mounted(model: DiagramModel) -> (DiagramComponent<GraphModelEngine>, Events) {
        let events = Events::default();
        let mut component = DiagramComponent::new(props(model, &events));
        component.mount().unwrap();
        (component, events)
    }

    fn node_keys(engine: &GraphModelEngine) -> BTreeSet<String> {
        engine.node_data().iter().map(|n| n.key.clone()).collect()
    }

    fn link_pairs(links: &[LinkData]) -> BTreeSet<(String, String)> {
        links.iter().map(|l| (l.from.clone(), l.to.clone())).collect()
    }

    #[test]
    fn test_render_and_mount() {
        let (component, events) = mounted(scenario_model());
        assert_eq!(
            component.render(),
            ContainerElement {
                id: "myDiagramDiv".into(),
                class_name: "myDiagram".into(),
            }
        );
        let engine = component.engine().unwrap();
        assert_eq!(engine.container_id(), "myDiagramDiv");
        assert_eq!(engine.node_data().len(), 5);
        assert_eq!(engine.link_data().len(), 4);
        assert_eq!(engine.listener_count(), 1);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_mount_twice_fails() {
        let (mut component, _) = mounted(scenario_model());
        assert!(matches!(component.mount(), Err(SyncError::AlreadyMounted)));
    }

    #[test]
    fn test_factory_error_propagates() {
        let props: DiagramProps<GraphModelEngine> =
            DiagramProps::new("div", DiagramModel::default(), |_: &str| {
                Err(EngineError::Factory("no canvas".into()))
            });
        let mut component = DiagramComponent::new(props);
        assert!(matches!(
            component.mount(),
            Err(SyncError::Engine(EngineError::Factory(_)))
        ));
    }

    #[test]
    fn test_no_callback_installs_no_listener() {
        let props = DiagramProps::new("div", scenario_model(), |id: &str| {
            Ok(GraphModelEngine::new(id))
        });
        let mut component = DiagramComponent::new(props);
        component.mount().unwrap();
        assert_eq!(component.engine().unwrap().listener_count(), 0);
    }

    #[test]
    fn test_inserted_node_reported_once() {
        let (mut component, events) = mounted(scenario_model());
        component
            .run_transaction("insert", |engine| {
                engine.add_node_data(NodeData::new("newNode"));
                Ok(())
            })
            .unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeEventKind::Add);
        assert_eq!(events[0].node_data().unwrap().key, "newNode");
        assert!(events[0].link_data().is_none());
        assert_eq!(events[0].model.nodes.len(), 6);
    }

    #[test]
    fn test_removed_node_reports_link_then_node() {
        let (mut component, events) = mounted(scenario_model());
        component
            .run_transaction("delete", |engine| Ok(engine.remove_node_data("Delta")))
            .unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ChangeEventKind::Remove);
        assert_eq!(events[0].link_data(), Some(&LinkData::new("Beta", "Delta")));
        assert_eq!(events[1].kind, ChangeEventKind::Remove);
        assert_eq!(events[1].node_data().unwrap().key, "Delta");
        assert!(!events[1].model.contains_node("Delta"));
    }

    #[test]
    fn test_regrouped_node_reported() {
        let (mut component, events) = mounted(scenario_model());
        component
            .run_transaction("group", |engine| engine.set_node_group("Omega", Some("Beta")))
            .unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeEventKind::Group);
        let node = events[0].node_data().unwrap();
        assert_eq!(node.key, "Omega");
        assert_eq!(node.get("group"), Some(&json!("Beta")));
    }

    #[test]
    fn test_declared_additions_not_echoed() {
        let (mut component, events) = mounted(scenario_model());
        let mut next = scenario_model();
        next.nodes.push(NodeData::new("Epsilon"));
        next.links.push(LinkData::new("Omega", "Epsilon"));

        let stats = component.update(next).unwrap();
        assert_eq!(stats.nodes_added, 1);
        assert_eq!(stats.links_added, 1);
        assert!(events.borrow().is_empty());
        assert!(component.engine().unwrap().find_node_data("Epsilon").is_some());
    }

    #[test]
    fn test_engine_matches_latest_model() {
        let (mut component, events) = mounted(scenario_model());
        let next = DiagramModel::new(
            vec![NodeData::new("Alpha"), NodeData::new("Beta"), NodeData::new("Zeta")],
            vec![LinkData::new("Alpha", "Zeta"), LinkData::new("Beta", "Alpha")],
        );

        let stats = component.update(next.clone()).unwrap();
        let engine = component.engine().unwrap();
        assert_eq!(
            node_keys(engine),
            BTreeSet::from(["Alpha", "Beta", "Zeta"].map(String::from))
        );
        assert_eq!(link_pairs(engine.link_data()), link_pairs(&next.links));
        assert_eq!(stats.nodes_removed, 3);
        assert_eq!(stats.nodes_added, 1);
        assert_eq!(stats.links_removed, 4);
        assert_eq!(stats.links_added, 2);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_unchanged_model_is_idempotent() {
        let (mut component, _) = mounted(scenario_model());

        let same = Rc::clone(component.model());
        assert!(component.update(same).unwrap().is_empty());
        assert!(component.engine().unwrap().transaction_log().is_empty());

        let equal = Rc::new(scenario_model());
        assert!(component.update(Rc::clone(&equal)).unwrap().is_empty());
        assert_eq!(component.engine().unwrap().transaction_log().len(), 1);

        assert!(component.update(equal).unwrap().is_empty());
        assert_eq!(component.engine().unwrap().transaction_log().len(), 1);
    }

    #[test]
    fn test_field_updates_merge() {
        let (mut component, events) = mounted(scenario_model());
        component
            .run_transaction("move", |engine| {
                engine.set_data_property(
                    &diagram_bridge_graph::DataRef::Node("Alpha".into()),
                    "loc",
                    json!("10 20"),
                )
            })
            .unwrap();

        let mut next = scenario_model();
        next.nodes[0].set("color", json!("red"));
        next.links[0].set("label", json!("yes"));
        let stats = component.update(next).unwrap();

        assert!(stats.is_empty());
        let engine = component.engine().unwrap();
        let alpha = engine.find_node_data("Alpha").unwrap();
        assert_eq!(alpha.get("color"), Some(&json!("red")));
        assert_eq!(alpha.get("loc"), Some(&json!("10 20")));
        assert_eq!(engine.link_data()[0].get("label"), Some(&json!("yes")));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_keyed_parallel_links() {
        let events = Events::default();
        let model = DiagramModel::new(
            vec![NodeData::new("A"), NodeData::new("B")],
            vec![
                LinkData::new("A", "B").with_field("key", "l1"),
                LinkData::new("A", "B").with_field("key", "l2"),
            ],
        );
        let mut component = DiagramComponent::new(
            props(model.clone(), &events)
                .with_config(ModelConfig::default().with_link_key_property("key")),
        );
        component.mount().unwrap();
        assert_eq!(component.engine().unwrap().link_data().len(), 2);

        assert!(component.update(model.clone()).unwrap().is_empty());
        assert_eq!(component.engine().unwrap().link_data().len(), 2);

        let mut next = model;
        next.links.remove(0);
        let stats = component.update(next).unwrap();
        assert_eq!(stats.links_removed, 1);
        let links = component.engine().unwrap().link_data();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].get_str("key"), Some("l2"));
    }

    #[test]
    fn test_numeric_keyed_parallel_links() {
        let events = Events::default();
        let model = DiagramModel::new(
            vec![NodeData::new("A"), NodeData::new("B")],
            vec![
                LinkData::new("A", "B").with_field("key", -1),
                LinkData::new("A", "B").with_field("key", -2),
            ],
        );
        let mut component = DiagramComponent::new(
            props(model.clone(), &events)
                .with_config(ModelConfig::default().with_link_key_property("key")),
        );
        component.mount().unwrap();
        let keys: Vec<_> = component
            .engine()
            .unwrap()
            .link_data()
            .iter()
            .map(|l| l.get("key").cloned())
            .collect();
        assert_eq!(keys, [Some(json!(-1)), Some(json!(-2))]);

        let mut next = model;
        next.links.pop();
        let stats = component.update(next).unwrap();
        assert_eq!(stats.links_removed, 1);
        assert_eq!(stats.links_added, 0);
        let links = component.engine().unwrap().link_data();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].get("key"), Some(&json!(-1)));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_rollback_delivers_nothing() {
        let (mut component, events) = mounted(scenario_model());
        let engine = component.engine_mut().unwrap();
        engine.start_transaction("drag").unwrap();
        engine.add_node_data(NodeData::new("temp"));
        engine.rollback_transaction().unwrap();

        assert!(events.borrow().is_empty());
        assert!(engine.find_node_data("temp").is_none());

        component
            .run_transaction("insert", |engine| {
                engine.add_node_data(NodeData::new("kept"));
                Ok(())
            })
            .unwrap();
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_failed_interaction_rolls_back() {
        let (mut component, events) = mounted(scenario_model());
        let result = component.run_transaction("regroup", |engine| {
            engine.add_node_data(NodeData::new("orphan"));
            engine.set_node_group("Missing", Some("Alpha"))
        });

        assert!(matches!(
            result,
            Err(SyncError::Engine(EngineError::NodeNotFound(_)))
        ));
        assert!(events.borrow().is_empty());
        assert!(component.engine().unwrap().find_node_data("orphan").is_none());
    }

    #[test]
    fn test_update_hook_runs_inside_transaction() {
        let events = Events::default();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut component = DiagramComponent::new(props(scenario_model(), &events).with_update_hook(
            move |engine: &mut GraphModelEngine| {
                assert!(engine.in_transaction());
                seen.set(seen.get() + 1);
            },
        ));
        component.mount().unwrap();
        assert_eq!(calls.get(), 0);

        component.update(scenario_model()).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_selected_on_mount() {
        let events = Events::default();
        let mut component =
            DiagramComponent::new(props(scenario_model(), &events).with_selected("Beta"));
        component.mount().unwrap();
        let selected: Vec<_> = component.engine().unwrap().selection().collect();
        assert_eq!(selected, ["Beta"]);
    }

    #[test]
    fn test_deferred_mount() {
        let events = Events::default();
        let mut component = DiagramComponent::new(props(scenario_model(), &events));
        component.mount_when_sized().unwrap();
        assert_eq!(component.state(), MountState::AwaitingLayout);

        let zero = ContainerSize::default();
        assert_eq!(component.poll_layout(zero).unwrap(), MountState::AwaitingLayout);
        assert_eq!(component.poll_layout(zero).unwrap(), MountState::AwaitingLayout);
        assert!(component.engine().is_none());

        // Updates before mount are kept for the initial load
        let mut next = scenario_model();
        next.nodes.push(NodeData::new("Late"));
        assert!(component.update(next).unwrap().is_empty());

        let size = ContainerSize::new(640.0, 480.0);
        assert_eq!(component.poll_layout(size).unwrap(), MountState::AwaitingLayout);
        assert_eq!(component.poll_layout(size).unwrap(), MountState::Mounted);
        assert_eq!(component.engine().unwrap().node_data().len(), 6);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_unmount_empties_and_silences() {
        let (mut component, events) = mounted(scenario_model());
        component.unmount();

        assert_eq!(component.state(), MountState::Unmounted);
        let engine = component.engine_mut().unwrap();
        assert!(engine.node_data().is_empty());
        assert!(engine.link_data().is_empty());
        assert_eq!(engine.listener_count(), 0);

        engine.add_node_data(NodeData::new("late"));
        assert!(events.borrow().is_empty());

        assert!(matches!(
            component.update(scenario_model()),
            Err(SyncError::Unmounted)
        ));
        assert!(matches!(
            component.run_transaction("x", |_| Ok(())),
            Err(SyncError::Unmounted)
        ));
        component.unmount();
    }

    #[test]
    fn test_poll_after_unmount_is_noop() {
        let events = Events::default();
        let mut component = DiagramComponent::new(props(scenario_model(), &events));
        component.mount_when_sized().unwrap();
        component.unmount();

        let size = ContainerSize::new(100.0, 100.0);
        assert_eq!(component.poll_layout(size).unwrap(), MountState::Unmounted);
        assert_eq!(component.poll_layout(size).unwrap(), MountState::Unmounted);
        assert!(component.engine().is_none());
    }
}
