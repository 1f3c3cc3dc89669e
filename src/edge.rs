use serde::{Deserialize, Serialize};

/// A connection attempt reported by the canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Connect the default output of `source` to the default input of `target`
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_handle: None,
            target: target.into(),
            target_handle: None,
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }
}

/// Directed edge from one node's output to another node's input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,

    /// Node the conversation comes FROM
    pub source: String,
    #[serde(default)]
    pub source_handle: Option<String>,

    /// Node the conversation goes TO
    pub target: String,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl FlowEdge {
    /// Build an edge from an accepted connection
    pub fn from_connection(id: impl Into<String>, connection: Connection) -> Self {
        Self {
            id: id.into(),
            source: connection.source,
            source_handle: connection.source_handle,
            target: connection.target,
            target_handle: connection.target_handle,
        }
    }

    /// Check if this edge already occupies the output handle `source`/`source_handle`
    pub fn uses_output(&self, source: &str, source_handle: Option<&str>) -> bool {
        self.source == source && self.source_handle.as_deref() == source_handle
    }

    /// Check if this edge ends at a given node
    pub fn ends_at(&self, node_id: &str) -> bool {
        self.target == node_id
    }
}
