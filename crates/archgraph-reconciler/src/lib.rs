//! archgraph-reconciler: Source Reconciler
//!
//! Converts independently analyzed source modules into one cross-referenced
//! entity set in two explicit passes:
//! - Pass 1 ([`Collector`]) observes every module and builds the export
//!   registry, the entity registry and the dependency arena
//! - Pass 2 ([`Resolver`]) takes those registries as input and materializes
//!   entities, fusing primary classes with their files
//!
//! # Example
//!
//! ```
//! use archgraph_reconciler::{resolve, ModuleDescriptor, ReconcileOptions};
//!
//! let module = ModuleDescriptor::new("src/main.ts");
//! let result = resolve(&[module], &ReconcileOptions::with_programs());
//! assert!(result.success);
//! assert!(result.entities.iter().any(|e| e.name == "MainProgram"));
//! ```

mod dependency;
mod descriptor;
mod error;
mod fusion;
mod options;
mod paths;
mod registry;
mod resolver;

pub use dependency::{purpose_of, DependencyArena, DependencyId, DependencyRecord};
pub use descriptor::*;
pub use error::ReconcileError;
pub use fusion::{plan_module, primary_class, FusionStrategy, ModulePlan};
pub use options::ReconcileOptions;
pub use registry::{
    Collector, Declared, EntityRegistry, ExportRegistry, ImportTarget, ModuleExports, ModuleId,
    Registries,
};
pub use resolver::{signature_of, unwrap_type, Resolver};

use archgraph_model::Entity;
use tracing::debug;

/// Result of one reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    /// True when no hard error was found
    pub success: bool,
    /// Canonical entities; empty when `success` is false
    pub entities: Vec<Entity>,
    /// Hard errors and advisory warnings, in discovery order
    pub diagnostics: Vec<ReconcileError>,
}

impl ReconcileResult {
    pub fn errors(&self) -> impl Iterator<Item = &ReconcileError> {
        self.diagnostics.iter().filter(|d| d.is_hard_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ReconcileError> {
        self.diagnostics.iter().filter(|d| !d.is_hard_error())
    }
}

/// Reconcile module descriptors into canonical entities.
///
/// Input order does not matter: modules are processed sorted by path.
pub fn resolve(descriptors: &[ModuleDescriptor], options: &ReconcileOptions) -> ReconcileResult {
    let mut modules = descriptors.to_vec();
    modules.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    // Pass 1: Collection
    let (registries, mut diagnostics) = Collector::new(options).collect(&modules);

    // Pass 2: Resolution, over the finished registries
    let (entities, resolution_diagnostics) = Resolver::new(&modules, &registries, options).resolve();
    diagnostics.extend(resolution_diagnostics);

    let success = !diagnostics.iter().any(ReconcileError::is_hard_error);
    debug!(
        modules = modules.len(),
        entities = entities.len(),
        diagnostics = diagnostics.len(),
        success,
        "reconciled modules"
    );

    ReconcileResult {
        success,
        entities: if success { entities } else { Vec::new() },
        diagnostics,
    }
}
