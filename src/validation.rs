use crate::{FlowEdge, FlowNode};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DUPLICATE_OUTPUT_MESSAGE: &str =
    "Each output can only have one connection. Please remove the existing connection first.";
pub const SAVE_SUCCESS_MESSAGE: &str = "Flow saved successfully!";

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Warning, // Yellow - informational or rejected edit
    Error,   // Red - blocks saving
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message shown in the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub severity: ValidationSeverity,
    pub message: String,
}

impl ValidationError {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }

    /// Rejected connection: the output handle is already in use
    pub fn duplicate_output() -> Self {
        Self::warning(DUPLICATE_OUTPUT_MESSAGE)
    }

    /// More than one node has no incoming edge
    pub fn multiple_roots(count: usize) -> Self {
        Self::error(format!(
            "Found {} nodes without incoming connections. Only one start node is allowed.",
            count
        ))
    }

    /// Transient notice after a successful save
    pub fn saved() -> Self {
        Self::warning(SAVE_SUCCESS_MESSAGE)
    }
}

/// Check if any item blocks saving
pub fn has_errors(items: &[ValidationError]) -> bool {
    items.iter().any(ValidationError::is_error)
}

/// Check if any item is a warning
pub fn has_warnings(items: &[ValidationError]) -> bool {
    items
        .iter()
        .any(|i| i.severity == ValidationSeverity::Warning)
}

/// Validator for flow graphs
pub struct Validator;

impl Validator {
    /// Run all validations. Pure: the same graph always yields the same list.
    pub fn validate(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // A single node is trivially a valid flow
        if nodes.len() <= 1 {
            return errors;
        }

        let roots = Self::find_roots(nodes, edges);
        if roots.len() > 1 {
            errors.push(ValidationError::multiple_roots(roots.len()));
        }

        errors
    }

    /// Nodes with no incoming edges, in node order
    pub fn find_roots<'a>(nodes: &'a [FlowNode], edges: &[FlowEdge]) -> Vec<&'a FlowNode> {
        nodes
            .iter()
            .filter(|n| !edges.iter().any(|e| e.ends_at(&n.id)))
            .collect()
    }
}
