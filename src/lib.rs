// Chatbot Flow Builder - Core Library

pub mod changes;
pub mod config;
pub mod edge;
pub mod event;
pub mod id_generator;
pub mod node;
pub mod notice;
pub mod palette;
pub mod storage;
pub mod store;
pub mod validation;
pub mod viewport;

// Re-export main types for convenience
pub use changes::{EdgeChange, NodeChange};
pub use config::BuilderConfig;
pub use edge::{Connection, FlowEdge};
pub use event::{FlowEvent, Observers, StoreEvent, SubscriptionId};
pub use id_generator::IdGenerator;
pub use node::{FlowNode, MessageData, NodeKind, Position, DEFAULT_MESSAGE_TEXT};
pub use notice::{Clock, ManualClock, SystemClock};
pub use palette::NodeTypeDescriptor;
pub use storage::{FileStore, FlowDocument, KeyValueStore, MemoryStore};
pub use store::{FlowStore, SaveOutcome, START_NODE_ID, START_NODE_TEXT};
pub use validation::{ValidationError, ValidationSeverity, Validator};
pub use viewport::Viewport;
