//! Error types for entity graph construction

use crate::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two entities declared with the same name
    #[error("Duplicate entity name '{name}' (first declared at {previous})")]
    DuplicateName {
        name: String,
        position: Position,
        previous: Position,
    },
}

impl GraphError {
    pub fn position(&self) -> Position {
        match self {
            GraphError::DuplicateName { position, .. } => *position,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GraphError::DuplicateName { name, .. } => name,
        }
    }
}
