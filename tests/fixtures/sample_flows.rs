// Helper functions to build stores and flows used across integration tests

#![allow(dead_code)]

use chatbot_flow_builder::{
    BuilderConfig, Connection, FlowDocument, FlowEdge, FlowNode, FlowStore, ManualClock,
    MemoryStore, Position,
};

/// The default one-node store, backed by an in-memory store and a manual clock
pub fn default_store() -> (FlowStore, MemoryStore, ManualClock) {
    let storage = MemoryStore::new();
    let clock = ManualClock::new();
    let store = FlowStore::new(storage.clone()).with_clock(clock.clone());
    (store, storage, clock)
}

/// An empty store, backed by an in-memory store and a manual clock
pub fn empty_store() -> (FlowStore, MemoryStore, ManualClock) {
    let storage = MemoryStore::new();
    let clock = ManualClock::new();
    let store = FlowStore::empty(&BuilderConfig::default(), storage.clone()).with_clock(clock.clone());
    (store, storage, clock)
}

pub fn node(id: &str) -> FlowNode {
    FlowNode::message(id, Position::default(), id)
}

pub fn edge(id: &str, source: &str, target: &str) -> FlowEdge {
    FlowEdge::from_connection(id, Connection::new(source, target))
}

/// A -> B, plus a disconnected C (two roots)
pub fn two_root_document() -> FlowDocument {
    FlowDocument {
        nodes: vec![node("a"), node("b"), node("c")],
        edges: vec![edge("edge-00", "a", "b")],
    }
}

/// A -> B -> C
pub fn linear_document() -> FlowDocument {
    FlowDocument {
        nodes: vec![node("a"), node("b"), node("c")],
        edges: vec![edge("edge-00", "a", "b"), edge("edge-01", "b", "c")],
    }
}

/// Store built from a document, backed by an in-memory store and a manual clock
pub fn store_from(document: FlowDocument) -> (FlowStore, MemoryStore, ManualClock) {
    let storage = MemoryStore::new();
    let clock = ManualClock::new();
    let store = FlowStore::from_document(document, &BuilderConfig::default(), storage.clone())
        .with_clock(clock.clone());
    (store, storage, clock)
}
