//! Structural issues found by the validator

use crate::Severity;
use archgraph_model::{EntityKind, Position, Relation};
use thiserror::Error;

/// Suggestion attached to every orphan
pub const ORPHAN_SUGGESTION: &str = "Remove or reference this entity";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// E-GRAPH-001: files importing each other in a loop
    #[error("Circular import detected: {cycle}")]
    CircularImport {
        /// Full cycle path, e.g., "a -> b -> a"
        cycle: String,
        /// First file of the cycle in source order
        first: String,
        position: Position,
    },

    /// E-GRAPH-002: nothing outside the entity's own cycle refers to it
    #[error("Orphaned entity: {name} is not referenced by any other entity")]
    Orphan { name: String, position: Position },

    /// E-GRAPH-003: a Program entry that names a non-File entity
    #[error("Program '{program}' entry must reference a File entity, but '{entry}' is a {kind}")]
    InvalidEntry {
        program: String,
        entry: String,
        kind: EntityKind,
        position: Position,
    },

    /// E-GRAPH-004: a relationship naming an entity absent from the graph
    #[error("Unresolved reference: '{from}' {relation} '{target}' which is not declared")]
    UnresolvedReference {
        from: String,
        relation: Relation,
        target: String,
        position: Position,
    },

    /// E-GRAPH-005: two declarations sharing a name
    #[error("Duplicate entity name '{name}'")]
    DuplicateName { name: String, position: Position },
}

impl ValidationIssue {
    pub fn position(&self) -> Position {
        match self {
            ValidationIssue::CircularImport { position, .. } => *position,
            ValidationIssue::Orphan { position, .. } => *position,
            ValidationIssue::InvalidEntry { position, .. } => *position,
            ValidationIssue::UnresolvedReference { position, .. } => *position,
            ValidationIssue::DuplicateName { position, .. } => *position,
        }
    }

    /// Name of the entity the issue is reported against
    pub fn anchor(&self) -> &str {
        match self {
            ValidationIssue::CircularImport { first, .. } => first,
            ValidationIssue::Orphan { name, .. } => name,
            ValidationIssue::InvalidEntry { program, .. } => program,
            ValidationIssue::UnresolvedReference { from, .. } => from,
            ValidationIssue::DuplicateName { name, .. } => name,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::UnresolvedReference { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ValidationIssue::Orphan { .. } => Some(ORPHAN_SUGGESTION),
            _ => None,
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::CircularImport { .. } => "E-GRAPH-001",
            ValidationIssue::Orphan { .. } => "E-GRAPH-002",
            ValidationIssue::InvalidEntry { .. } => "E-GRAPH-003",
            ValidationIssue::UnresolvedReference { .. } => "E-GRAPH-004",
            ValidationIssue::DuplicateName { .. } => "E-GRAPH-005",
        }
    }
}
