use crate::changes::{apply_edge_changes, apply_node_changes, EdgeChange, NodeChange};
use crate::notice::{Clock, NoticeTimer, SystemClock};
use crate::validation::{self, ValidationError, Validator};
use crate::{
    BuilderConfig, Connection, FlowDocument, FlowEdge, FlowEvent, FlowNode, IdGenerator,
    KeyValueStore, NodeKind, Observers, Position, StoreEvent, SubscriptionId, Viewport,
};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const START_NODE_ID: &str = "start-1";
pub const START_NODE_TEXT: &str = "Welcome! How can I help you?";

const EDGE_ID_PREFIX: &str = "edge";

/// Oldest entries are dropped once the event log holds this many
pub const MAX_LOGGED_EVENTS: usize = 1000;

/// Result of `save_flow`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the durable store; the "saved" notice is showing
    Saved,
    /// Topology errors are showing and nothing was written
    Blocked,
}

/// Owns the flow graph, the selection and the visible messages.
///
/// Every mutation from the canvas goes through here. Mutations run to
/// completion one at a time; observers are notified after each one is
/// committed.
pub struct FlowStore {
    /// Nodes in creation order
    nodes: Vec<FlowNode>,

    /// Edges in creation order
    edges: Vec<FlowEdge>,

    selected_node_id: Option<String>,

    /// Messages shown in the toolbar
    validation_errors: Vec<ValidationError>,

    node_ids: HashMap<NodeKind, IdGenerator>,
    edge_ids: IdGenerator,

    notice: NoticeTimer,
    clock: Box<dyn Clock>,

    storage: Box<dyn KeyValueStore>,
    storage_key: String,

    /// Event log for history tracking, capped at `MAX_LOGGED_EVENTS`
    events: Vec<FlowEvent>,
    observers: Observers,
}

impl FlowStore {
    /// Create a store holding the default one-node flow
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self::with_config(&BuilderConfig::default(), storage)
    }

    /// Create a store holding the default one-node flow
    pub fn with_config(config: &BuilderConfig, storage: impl KeyValueStore + 'static) -> Self {
        let start = FlowNode::message(START_NODE_ID, Position::new(250.0, 50.0), START_NODE_TEXT);
        Self::build(vec![start], Vec::new(), config, Box::new(storage))
    }

    /// Create a store with no nodes
    pub fn empty(config: &BuilderConfig, storage: impl KeyValueStore + 'static) -> Self {
        Self::build(Vec::new(), Vec::new(), config, Box::new(storage))
    }

    /// Create a store from a saved flow. New ids continue after the ones in use.
    pub fn from_document(
        document: FlowDocument,
        config: &BuilderConfig,
        storage: impl KeyValueStore + 'static,
    ) -> Self {
        Self::build(document.nodes, document.edges, config, Box::new(storage))
    }

    fn build(
        nodes: Vec<FlowNode>,
        edges: Vec<FlowEdge>,
        config: &BuilderConfig,
        storage: Box<dyn KeyValueStore>,
    ) -> Self {
        let node_ids: HashMap<NodeKind, IdGenerator> = NodeKind::ALL
            .iter()
            .map(|kind| {
                let existing = nodes.iter().map(|n| n.id.as_str());
                (*kind, IdGenerator::from_existing_ids(kind.type_id(), existing))
            })
            .collect();
        let edge_ids =
            IdGenerator::from_existing_ids(EDGE_ID_PREFIX, edges.iter().map(|e| e.id.as_str()));

        Self {
            nodes,
            edges,
            selected_node_id: None,
            validation_errors: Vec::new(),
            node_ids,
            edge_ids,
            notice: NoticeTimer::new(config.notice_delay()),
            clock: Box::new(SystemClock),
            storage,
            storage_key: config.storage_key.clone(),
            events: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Replace the time source (tests drive the notice timer by hand)
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ========== Canvas Deltas ==========

    /// Apply node deltas from the canvas as-is
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        let applied = apply_node_changes(changes, &mut self.nodes);
        self.emit(StoreEvent::NodesChanged { applied });

        // Settings panel cannot point at a deleted node
        if let Some(selected) = self.selected_node_id.clone() {
            if !self.has_node(&selected) {
                self.select_node(None);
            }
        }
    }

    /// Apply edge deltas from the canvas as-is
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        let applied = apply_edge_changes(changes, &mut self.edges);
        self.emit(StoreEvent::EdgesChanged { applied });
    }

    // ========== Connections ==========

    /// Try to add an edge. Each output handle may back at most one edge.
    pub fn connect(&mut self, candidate: Connection) {
        if !self.has_node(&candidate.source) || !self.has_node(&candidate.target) {
            warn!(
                from = %candidate.source,
                to = %candidate.target,
                "Ignoring connection to a node that does not exist"
            );
            return;
        }

        let output_taken = self
            .edges
            .iter()
            .any(|e| e.uses_output(&candidate.source, candidate.source_handle.as_deref()));

        if output_taken {
            debug!(from = %candidate.source, "Output already connected, rejecting");
            self.emit(StoreEvent::ConnectionRejected {
                source: candidate.source,
                source_handle: candidate.source_handle,
            });
            self.set_errors(vec![ValidationError::duplicate_output()]);
            return;
        }

        let id = self.next_edge_id();
        let edge = FlowEdge::from_connection(id, candidate);
        debug!(id = %edge.id, from = %edge.source, to = %edge.target, "Edge added");

        let event = StoreEvent::EdgeAdded {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        };
        self.edges.push(edge);
        self.emit(event);
        self.clear_errors();
    }

    fn next_edge_id(&mut self) -> String {
        loop {
            let id = self.edge_ids.next_id();
            if !self.edges.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    // ========== Nodes ==========

    /// Add a node of the given kind with its default data. Returns the new id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let id = self.next_node_id(kind);
        info!(id = %id, kind = kind.type_id(), "Node added");

        self.nodes.push(FlowNode::new(id.clone(), kind, position));
        self.emit(StoreEvent::NodeAdded {
            id: id.clone(),
            kind,
            position,
        });

        id
    }

    /// Handle a palette drop. Empty or unknown type ids are ignored.
    pub fn drop_node(
        &mut self,
        type_id: &str,
        screen_point: Position,
        viewport: &Viewport,
    ) -> Option<String> {
        let Some(kind) = NodeKind::from_type_id(type_id) else {
            debug!(type_id, "Ignoring drop of unknown node type");
            return None;
        };

        let position = viewport.screen_to_graph(screen_point);
        Some(self.add_node(kind, position))
    }

    fn next_node_id(&mut self, kind: NodeKind) -> String {
        let generator = self
            .node_ids
            .entry(kind)
            .or_insert_with(|| IdGenerator::new(kind.type_id()));

        loop {
            let id = generator.next_id();
            if !self.nodes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }

    /// Replace a node's text. Unknown ids are ignored.
    pub fn update_node_text(&mut self, node_id: &str, text: impl Into<String>) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            debug!(node_id, "Text update for unknown node ignored");
            return;
        };

        node.set_text(text);
        self.emit(StoreEvent::NodeTextChanged {
            id: node_id.to_string(),
        });
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    // ========== Selection ==========

    pub fn select_node(&mut self, node_id: Option<&str>) {
        let new_id = node_id.map(str::to_string);
        if new_id == self.selected_node_id {
            return;
        }

        let old_id = std::mem::replace(&mut self.selected_node_id, new_id.clone());
        self.emit(StoreEvent::SelectionChanged { old_id, new_id });
    }

    /// Back to the node palette
    pub fn clear_selection(&mut self) {
        self.select_node(None);
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    /// The selected node, if it still exists
    pub fn selected_node(&self) -> Option<&FlowNode> {
        self.selected_node_id
            .as_deref()
            .and_then(|id| self.get_node(id))
    }

    // ========== Validation & Saving ==========

    /// Check the flow's topology. Does not touch the visible messages.
    pub fn validate(&self) -> Vec<ValidationError> {
        Validator::validate(&self.nodes, &self.edges)
    }

    /// Validate, then write the flow if nothing blocks it.
    ///
    /// Returns `Err` only when the durable store fails; the failure is also
    /// shown as an error message.
    pub fn save_flow(&mut self) -> Result<SaveOutcome> {
        let errors = self.validate();
        self.set_errors(errors);

        if self.has_errors() {
            info!(errors = self.validation_errors.len(), "Save blocked by validation errors");
            self.emit(StoreEvent::SaveBlocked {
                errors: self.validation_errors.len(),
            });
            return Ok(SaveOutcome::Blocked);
        }

        let document = self.document();
        if let Err(err) = document.save_to(&mut *self.storage, &self.storage_key) {
            let cause = format!("{:#}", err);
            warn!(error = %cause, "Failed to save flow");
            self.set_errors(vec![ValidationError::error(format!(
                "Failed to save flow: {}",
                cause
            ))]);
            return Err(err);
        }

        info!(
            key = %self.storage_key,
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Flow saved"
        );
        self.emit(StoreEvent::FlowSaved {
            key: self.storage_key.clone(),
            nodes: document.nodes.len(),
            edges: document.edges.len(),
        });

        self.set_errors(vec![ValidationError::saved()]);
        self.notice.schedule(self.clock.now());

        Ok(SaveOutcome::Saved)
    }

    /// Empty the visible messages and cancel any pending auto-clear
    pub fn clear_errors(&mut self) {
        self.notice.cancel();
        self.set_errors(Vec::new());
    }

    /// Replace the visible messages. Any pending auto-clear goes stale.
    fn set_errors(&mut self, errors: Vec<ValidationError>) {
        self.notice.bump();
        self.validation_errors = errors;
        self.emit(StoreEvent::ErrorsChanged {
            errors: self.validation_errors.clone(),
        });
    }

    /// Fire the auto-clear if it is due. Call from the host's event loop.
    /// Returns true when the messages were cleared.
    pub fn tick(&mut self) -> bool {
        if !self.notice.poll(self.clock.now()) {
            return false;
        }

        debug!("Saved notice expired");
        self.validation_errors.clear();
        self.emit(StoreEvent::NoticeExpired);
        self.emit(StoreEvent::ErrorsChanged { errors: Vec::new() });
        true
    }

    /// When the next `tick` has work to do, if ever
    pub fn next_deadline(&self) -> Option<Instant> {
        self.notice.next_deadline()
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    pub fn has_errors(&self) -> bool {
        validation::has_errors(&self.validation_errors)
    }

    pub fn has_warnings(&self) -> bool {
        validation::has_warnings(&self.validation_errors)
    }

    /// First visible message, as shown in the toolbar
    pub fn headline(&self) -> Option<&ValidationError> {
        self.validation_errors.first()
    }

    /// Saving is disabled while blocking errors are visible
    pub fn can_save(&self) -> bool {
        !self.has_errors()
    }

    /// Snapshot of the graph in its persisted form
    pub fn document(&self) -> FlowDocument {
        FlowDocument::from_graph(&self.nodes, &self.edges)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    // ========== Observers & Event Log ==========

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: StoreEvent) {
        self.observers.notify(&event);
        if self.events.len() >= MAX_LOGGED_EVENTS {
            self.events.remove(0);
        }
        self.events.push(FlowEvent::new(event));
    }

    /// Logged events, oldest first
    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
