//! Structural deltas reported by the canvas (drags, deletions).
//!
//! These are applied as-is: the canvas is the only source of node and edge
//! ids, so unknown ids are skipped rather than treated as errors.

use crate::{FlowEdge, FlowNode, Position};
use serde::{Deserialize, Serialize};

/// A change to a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// Node was dragged to a new position
    Position { id: String, position: Position },

    /// Node was deleted
    Remove { id: String },
}

/// A change to a single edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    /// Edge was deleted
    Remove { id: String },
}

/// Apply a batch of node changes in order. Returns how many changes matched a node.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut Vec<FlowNode>) -> usize {
    let mut applied = 0;

    for change in changes {
        match change {
            NodeChange::Position { id, position } => {
                if let Some(node) = nodes.iter_mut().find(|n| n.id == *id) {
                    node.set_position(*position);
                    applied += 1;
                }
            }
            NodeChange::Remove { id } => {
                let before = nodes.len();
                nodes.retain(|n| n.id != *id);
                if nodes.len() != before {
                    applied += 1;
                }
            }
        }
    }

    applied
}

/// Apply a batch of edge changes in order. Returns how many changes matched an edge.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &mut Vec<FlowEdge>) -> usize {
    let mut applied = 0;

    for change in changes {
        match change {
            EdgeChange::Remove { id } => {
                let before = edges.len();
                edges.retain(|e| e.id != *id);
                if edges.len() != before {
                    applied += 1;
                }
            }
        }
    }

    applied
}
