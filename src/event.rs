use crate::{NodeKind, Position, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A store event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub timestamp: DateTime<Utc>,
    pub event: StoreEvent,
}

impl FlowEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: StoreEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// State changes observers are told about, after the change is committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreEvent {
    NodeAdded {
        id: String,
        kind: NodeKind,
        position: Position,
    },

    /// A batch of node deltas from the canvas
    NodesChanged { applied: usize },

    /// A batch of edge deltas from the canvas
    EdgesChanged { applied: usize },

    NodeTextChanged { id: String },

    EdgeAdded {
        id: String,
        source: String,
        target: String,
    },

    ConnectionRejected {
        source: String,
        source_handle: Option<String>,
    },

    SelectionChanged {
        old_id: Option<String>,
        new_id: Option<String>,
    },

    /// The visible message list was replaced
    ErrorsChanged { errors: Vec<ValidationError> },

    SaveBlocked { errors: usize },

    FlowSaved {
        key: String,
        nodes: usize,
        edges: usize,
    },

    /// The transient "saved" notice cleared itself
    NoticeExpired,
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent)>;

/// Registered store observers
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Call every observer in subscription order
    pub fn notify(&mut self, event: &StoreEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
