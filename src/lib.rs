//! archgraph - Architecture as a checked artifact
//!
//! This is the root workspace crate. It re-exports the member crates,
//! composes them into the [`check`] operation over design text, and loads
//! descriptors and options from disk for the command line. The engines
//! themselves live in the workspace member crates.

mod check;
pub mod load;

pub use check::{check, CheckReport};
pub use load::{load_dependency_versions, load_descriptors, load_options, LoadError};

// Re-export main crates for convenience
pub use archgraph_differ as differ;
pub use archgraph_model as model;
pub use archgraph_parser as parser;
pub use archgraph_reconciler as reconciler;
pub use archgraph_validator as validator;
