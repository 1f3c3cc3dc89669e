#[path = "fixtures/sample_flows.rs"]
mod sample_flows;

use assert_matches::assert_matches;
use chatbot_flow_builder::{
    BuilderConfig, Connection, EdgeChange, FileStore, FlowDocument, FlowStore, KeyValueStore,
    NodeChange, NodeKind, Position, SaveOutcome, StoreEvent, ValidationError, ValidationSeverity,
    START_NODE_ID, START_NODE_TEXT,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sample_flows::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_build_connect_save_scenario() {
    let (mut store, storage, _) = default_store();

    assert_eq!(store.node_count(), 1);
    assert_eq!(store.get_node(START_NODE_ID).unwrap().text(), START_NODE_TEXT);

    let id = store.add_node(NodeKind::Message, Position::new(100.0, 100.0));
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.get_node(&id).unwrap().text(), "New message");

    store.connect(Connection::new(START_NODE_ID, id.as_str()));
    assert_eq!(store.edge_count(), 1);

    assert_matches!(store.save_flow(), Ok(SaveOutcome::Saved));
    assert!(!store.has_errors());

    let saved = FlowDocument::load_from(&storage, "chatbot-flow")
        .unwrap()
        .unwrap();
    assert_eq!(saved.nodes.len(), 2);
    assert_eq!(saved.edges.len(), 1);
    assert_eq!(saved, store.document());
}

#[test]
fn test_validate_three_nodes_one_edge() {
    let (store, _, _) = store_from(two_root_document());

    let errors = store.validate();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, ValidationSeverity::Error);
    assert!(errors[0].message.contains('2'));
}

#[test]
fn test_validate_linear_flow() {
    let (store, _, _) = store_from(linear_document());
    assert!(store.validate().is_empty());
}

#[test]
fn test_validate_does_not_touch_visible_messages() {
    let (store, _, _) = store_from(two_root_document());

    let first = store.validate();
    let second = store.validate();

    assert_eq!(first, second);
    assert!(store.validation_errors().is_empty());
}

#[test]
fn test_single_node_always_valid() {
    let (mut store, _, _) = empty_store();
    assert!(store.validate().is_empty());

    let id = store.add_node(NodeKind::Message, Position::default());
    store.update_node_text(&id, "");
    assert!(store.validate().is_empty());
}

#[test]
fn test_blocked_save_never_writes() {
    let (mut store, storage, _) = store_from(two_root_document());

    assert_matches!(store.save_flow(), Ok(SaveOutcome::Blocked));

    assert_eq!(storage.write_count(), 0);
    assert!(!storage.contains_key("chatbot-flow"));
    assert_eq!(store.validation_errors().len(), 1);
    assert!(store.validation_errors()[0].is_error());
    assert_eq!(store.next_deadline(), None);
}

#[test]
fn test_saved_payload_preserves_order() {
    let (mut store, storage, _) = store_from(linear_document());
    store.apply_node_changes(&[NodeChange::Position {
        id: "b".to_string(),
        position: Position::new(5.0, 6.0),
    }]);

    store.save_flow().unwrap();

    let json = storage.get("chatbot-flow").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let ids: Vec<&str> = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(value["nodes"][1]["position"]["x"], 5.0);
    assert_eq!(value["edges"][1]["id"], "edge-01");
}

#[test]
fn test_saved_notice_clears_after_delay() {
    let (mut store, _, clock) = default_store();

    store.save_flow().unwrap();
    assert_eq!(store.validation_errors(), &[ValidationError::saved()]);
    assert_eq!(store.validation_errors()[0].severity, ValidationSeverity::Warning);

    clock.advance(Duration::from_secs(3));
    assert!(store.tick());
    assert!(store.validation_errors().is_empty());
}

#[test]
fn test_second_save_restarts_notice() {
    let (mut store, _, clock) = default_store();

    store.save_flow().unwrap();
    clock.advance(Duration::from_secs(2));
    store.save_flow().unwrap();

    clock.advance(Duration::from_secs(2));
    assert!(!store.tick());
    assert_eq!(store.validation_errors().len(), 1);

    clock.advance(Duration::from_secs(1));
    assert!(store.tick());
}

#[test]
fn test_custom_notice_delay_and_key() {
    let config = BuilderConfig {
        storage_key: "support-bot".to_string(),
        notice_delay_ms: 500,
        ..BuilderConfig::default()
    };
    let storage = chatbot_flow_builder::MemoryStore::new();
    let clock = chatbot_flow_builder::ManualClock::new();
    let mut store = FlowStore::with_config(&config, storage.clone()).with_clock(clock.clone());

    store.save_flow().unwrap();
    assert!(storage.contains_key("support-bot"));

    clock.advance(Duration::from_millis(500));
    assert!(store.tick());
}

#[test]
fn test_save_to_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let config = BuilderConfig {
        data_dir: temp_dir.path().join("flows"),
        ..BuilderConfig::default()
    };
    let storage = FileStore::open(&config.data_dir).unwrap();
    let mut store = FlowStore::with_config(&config, storage);

    assert_matches!(store.save_flow(), Ok(SaveOutcome::Saved));

    let path = config.data_dir.join("chatbot-flow.json");
    let loaded = FlowDocument::read_file(&path).unwrap();
    assert_eq!(loaded, store.document());
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("quota exceeded"))
    }
}

#[test]
fn test_storage_failure_is_reported() {
    let mut store = FlowStore::new(FailingStore);

    let result = store.save_flow();

    assert!(result.is_err());
    assert!(store.has_errors());
    assert!(store.validation_errors()[0].message.contains("quota exceeded"));
    assert_eq!(store.next_deadline(), None);
}

#[test]
fn test_update_missing_node_leaves_graph_unchanged() {
    let (mut store, _, _) = store_from(linear_document());
    let before = store.document();

    store.update_node_text("missing-id", "x");

    assert_eq!(store.document(), before);
}

#[test]
fn test_delete_then_reconnect() {
    let (mut store, _, _) = store_from(linear_document());

    store.connect(Connection::new("a", "c"));
    assert_eq!(store.validation_errors().len(), 1);

    store.apply_edge_changes(&[EdgeChange::Remove {
        id: "edge-00".to_string(),
    }]);
    store.connect(Connection::new("a", "c"));

    assert!(store.validation_errors().is_empty());
    assert_eq!(store.edge_count(), 2);
    assert!(store.edges().iter().any(|e| e.source == "a" && e.target == "c"));
}

#[test]
fn test_load_document_with_oversized_id_suffix() {
    let document = FlowDocument {
        nodes: vec![node("message-0000000000001"), node("message-03")],
        edges: vec![edge("edge-0000000000000000", "message-03", "message-0000000000001")],
    };
    let (mut store, _, _) = store_from(document);

    assert!(store.validate().is_empty());

    let id = store.add_node(NodeKind::Message, Position::default());
    assert_eq!(id, "message-04");

    store.connect(Connection::new("message-0000000000001", id.as_str()));
    assert_eq!(store.edges()[1].id, "edge-00");
}

#[test]
fn test_target_handle_survives_connect_and_save() {
    let (mut store, storage, _) = default_store();
    let id = store.add_node(NodeKind::Message, Position::default());

    store.connect(
        Connection::new(START_NODE_ID, id.as_str())
            .with_source_handle("out")
            .with_target_handle("in"),
    );
    assert_matches!(store.save_flow(), Ok(SaveOutcome::Saved));

    let saved = FlowDocument::load_from(&storage, "chatbot-flow")
        .unwrap()
        .unwrap();
    assert_eq!(saved.edges[0].source_handle.as_deref(), Some("out"));
    assert_eq!(saved.edges[0].target_handle.as_deref(), Some("in"));
}

#[test]
fn test_fan_in_is_unrestricted() {
    let (mut store, _, _) = empty_store();
    let a = store.add_node(NodeKind::Message, Position::default());
    let b = store.add_node(NodeKind::Message, Position::default());
    let target = store.add_node(NodeKind::Message, Position::default());

    store.connect(Connection::new(a.as_str(), target.as_str()).with_target_handle("in"));
    store.connect(Connection::new(b.as_str(), target.as_str()).with_target_handle("in"));
    store.connect(Connection::new(a.as_str(), target.as_str()).with_source_handle("alt"));

    assert_eq!(store.edge_count(), 3);
    assert!(store.validation_errors().is_empty());
    assert!(store.edges().iter().all(|e| e.ends_at(&target)));
}

#[test]
fn test_document_without_node_type_loads() {
    let json = r#"{
        "nodes": [
            {"id": "a", "position": {"x": 0.0, "y": 0.0}, "data": {"text": "Hi", "nodeType": "message"}},
            {"id": "b", "position": {"x": 0.0, "y": 90.0}, "data": {"text": "Bye", "nodeType": "message"}}
        ],
        "edges": [{"id": "edge-00", "source": "a", "target": "b"}]
    }"#;

    let document = FlowDocument::from_json(json).unwrap();
    assert!(document.nodes.iter().all(|n| n.kind == NodeKind::Message));

    let (store, _, _) = store_from(document);
    assert!(store.validate().is_empty());
}

#[test]
fn test_observer_rerenders_on_each_change() {
    let (mut store, _, clock) = default_store();
    let kinds = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&kinds);
    store.subscribe(move |event| {
        let name = match event {
            StoreEvent::FlowSaved { .. } => "saved",
            StoreEvent::ErrorsChanged { .. } => "errors",
            StoreEvent::NoticeExpired => "expired",
            _ => "other",
        };
        sink.borrow_mut().push(name);
    });

    store.save_flow().unwrap();
    clock.advance(Duration::from_secs(3));
    store.tick();

    assert_eq!(
        *kinds.borrow(),
        vec!["errors", "saved", "errors", "expired", "errors"]
    );
}

proptest! {
    #[test]
    fn prop_one_edge_per_output(
        attempts in prop::collection::vec((0usize..5, prop::option::of(0u8..2), 0usize..5), 0..40)
    ) {
        let (mut store, _, _) = empty_store();
        let ids: Vec<String> = (0..5)
            .map(|_| store.add_node(NodeKind::Message, Position::default()))
            .collect();

        for (source, handle, target) in attempts {
            let mut conn = Connection::new(ids[source].as_str(), ids[target].as_str());
            if let Some(h) = handle {
                conn = conn.with_source_handle(format!("out-{}", h));
            }
            store.connect(conn);
        }

        let mut outputs = HashSet::new();
        for edge in store.edges() {
            prop_assert!(outputs.insert((edge.source.clone(), edge.source_handle.clone())));
        }

        let edge_ids: HashSet<&str> = store.edges().iter().map(|e| e.id.as_str()).collect();
        prop_assert_eq!(edge_ids.len(), store.edge_count());
    }
}
