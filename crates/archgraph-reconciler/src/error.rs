//! Problems found while reconciling module descriptors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// E-RECON-001: two entities with the same name (hard error)
    #[error("Duplicate entity name '{name}' (declared in {first} and {second})")]
    DuplicateEntityName {
        name: String,
        first: String,
        second: String,
    },

    /// E-RECON-002: primary class cannot be fused with its file (hard error)
    #[error("Cannot fuse class '{class}' with {file}: the name is also declared as a {other} in the same module")]
    UnfusableClass {
        class: String,
        file: String,
        other: String,
    },

    /// W-RECON-001: re-export whose source module is unknown
    #[error("Re-export source '{source_specifier}' in {file} does not match any module")]
    UnresolvedReExport {
        file: String,
        source_specifier: String,
    },

    /// W-RECON-002: several classes and none of them is primary
    #[error("{file} declares several classes ({}) and none is primary; the module is not fused", classes.join(", "))]
    MissingPrimaryClass { file: String, classes: Vec<String> },

    /// W-RECON-003: configured entry point matches no module
    #[error("Entry point '{entry}' does not match any module")]
    EntryPointNotFound { entry: String },
}

impl ReconcileError {
    /// Whether this error blocks output
    pub fn is_hard_error(&self) -> bool {
        match self {
            ReconcileError::DuplicateEntityName { .. } => true,
            ReconcileError::UnfusableClass { .. } => true,
            ReconcileError::UnresolvedReExport { .. } => false,
            ReconcileError::MissingPrimaryClass { .. } => false,
            ReconcileError::EntryPointNotFound { .. } => false,
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            ReconcileError::DuplicateEntityName { .. } => "E-RECON-001",
            ReconcileError::UnfusableClass { .. } => "E-RECON-002",
            ReconcileError::UnresolvedReExport { .. } => "W-RECON-001",
            ReconcileError::MissingPrimaryClass { .. } => "W-RECON-002",
            ReconcileError::EntryPointNotFound { .. } => "W-RECON-003",
        }
    }

    /// Module path the problem belongs to, when there is one
    pub fn file(&self) -> Option<&str> {
        match self {
            ReconcileError::DuplicateEntityName { second, .. } => Some(second),
            ReconcileError::UnfusableClass { file, .. } => Some(file),
            ReconcileError::UnresolvedReExport { file, .. } => Some(file),
            ReconcileError::MissingPrimaryClass { file, .. } => Some(file),
            ReconcileError::EntryPointNotFound { .. } => None,
        }
    }
}
