//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Selector parsing has no error path at all:
//! bad fragments degrade to a predicate that never matches.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    /// A node argument has a type that is not accepted at this point.
    #[error("Type violation: {0}")]
    TypeViolation(String),

    /// A structural rule would be broken (cycle, second document element, ...).
    #[error("Hierarchy violation: {0}")]
    HierarchyViolation(String),

    /// A child or reference child is not a child of the mutated node.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The id was never allocated or its node has been released.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DomError {
    pub fn is_type_violation(&self) -> bool {
        matches!(self, DomError::TypeViolation(_))
    }

    pub fn is_hierarchy_violation(&self) -> bool {
        matches!(self, DomError::HierarchyViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomError::NotFound(_))
    }
}
