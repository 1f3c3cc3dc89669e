use serde::{Deserialize, Serialize};

/// Text given to freshly created message nodes
pub const DEFAULT_MESSAGE_TEXT: &str = "New message";

/// A point in graph space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Kind of a node; decides its default data and how it is rendered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Message,
    // Future: Image, QuickReply, ApiCall
}

impl NodeKind {
    /// Every kind that can be created from the palette
    pub const ALL: &'static [NodeKind] = &[NodeKind::Message];

    /// Tag used in ids, drag payloads and the serialized `type` field
    pub fn type_id(&self) -> &'static str {
        match self {
            NodeKind::Message => "message",
        }
    }

    /// Resolve a palette/drag payload type id
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.type_id() == type_id)
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Message => "Message",
        }
    }

    /// Data a node of this kind starts with
    pub fn default_data(&self) -> MessageData {
        match self {
            NodeKind::Message => MessageData::new(DEFAULT_MESSAGE_TEXT),
        }
    }
}

/// Payload carried by a message node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub text: String,
    #[serde(default)]
    pub node_type: NodeKind,
}

impl MessageData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            node_type: NodeKind::Message,
        }
    }
}

/// A single step in the conversation flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowNode {
    /// Unique for the lifetime of the node
    pub id: String,

    /// Documents written without a `type` field load as messages
    #[serde(rename = "type", default)]
    pub kind: NodeKind,

    /// Top-left corner in graph space
    pub position: Position,

    pub data: MessageData,
}

impl FlowNode {
    /// Create a node with the default data for its kind
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: kind.default_data(),
        }
    }

    /// Create a message node with the given text
    pub fn message(id: impl Into<String>, position: Position, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Message,
            position,
            data: MessageData::new(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.data.text
    }

    /// Replace the text, leaving everything else untouched
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.data.text = text.into();
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
