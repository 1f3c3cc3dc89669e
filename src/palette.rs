use crate::{MessageData, NodeKind};
use serde::{Deserialize, Serialize};

/// Entry in the node palette
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescriptor {
    pub id: String,
    pub label: String,
    pub description: String,
    pub default_data: MessageData,
}

impl NodeTypeDescriptor {
    /// Descriptor for a node kind
    pub fn for_kind(kind: NodeKind) -> Self {
        let description = match kind {
            NodeKind::Message => "Send a text message to the user",
        };

        Self {
            id: kind.type_id().to_string(),
            label: kind.label().to_string(),
            description: description.to_string(),
            default_data: kind.default_data(),
        }
    }

    /// Kind this descriptor creates
    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_type_id(&self.id)
    }
}

/// The fixed catalog of creatable node types
pub fn catalog() -> Vec<NodeTypeDescriptor> {
    NodeKind::ALL
        .iter()
        .copied()
        .map(NodeTypeDescriptor::for_kind)
        .collect()
}
