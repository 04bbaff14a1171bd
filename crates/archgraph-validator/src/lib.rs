//! archgraph-validator - Structural checks over entity graphs
//!
//! [`validate`] runs circular import detection and orphan detection to
//! completion, independently of each other, and returns every finding as a
//! [`Diagnostic`] in a stable order. [`check_references`] adds the entry-kind
//! and unresolved-name checks used when checking hand-written design text.

mod cycle;
mod diagnostics;
mod error;
mod orphan;
mod references;

pub use cycle::CycleDetector;
pub use diagnostics::*;
pub use error::*;
pub use orphan::OrphanDetector;
pub use references::ReferenceChecker;

use archgraph_model::EntityGraph;
use tracing::debug;

/// Detect circular imports and orphaned entities
pub fn validate(graph: &EntityGraph) -> Vec<Diagnostic> {
    let cycles = CycleDetector::new(graph).detect_cycles();
    let orphans = OrphanDetector::new(graph).detect_orphans();
    debug!(
        entities = graph.len(),
        cycles = cycles.len(),
        orphans = orphans.len(),
        "validated entity graph"
    );

    let mut diagnostics: Vec<Diagnostic> = cycles
        .into_iter()
        .chain(orphans)
        .map(Diagnostic::from)
        .collect();
    sort_diagnostics(&mut diagnostics);
    diagnostics
}

/// Program entries naming non-File entities (errors) and relationship
/// targets absent from the graph (warnings)
pub fn check_references(graph: &EntityGraph) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = ReferenceChecker::new(graph)
        .check()
        .into_iter()
        .map(Diagnostic::from)
        .collect();
    sort_diagnostics(&mut diagnostics);
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_model::{Entity, EntityBody, File, Position, Program};

    fn file(name: &str, line: u32, imports: &[&str]) -> Entity {
        Entity::new(
            name,
            Position::new(line, 1),
            EntityBody::File(File {
                path: format!("src/{name}.ts"),
                imports: imports.iter().map(|s| s.to_string()).collect(),
                exports: vec![],
            }),
        )
    }

    fn graph(entities: Vec<Entity>) -> EntityGraph {
        let (graph, errors) = EntityGraph::from_entities(entities);
        assert!(errors.is_empty());
        graph
    }

    #[test]
    fn test_mutual_import_yields_three_errors() {
        let g = graph(vec![file("A", 1, &["B"]), file("B", 2, &["A"])]);
        let diagnostics = validate(&g);
        assert_eq!(diagnostics.len(), 3, "{diagnostics:#?}");
        assert!(diagnostics.iter().all(Diagnostic::is_error));

        let cycles: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.message.starts_with("Circular import detected"))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].message.contains("A -> B -> A"));
        assert!(cycles[0].suggestion.is_none());

        let orphans: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.message.starts_with("Orphaned entity"))
            .collect();
        assert_eq!(orphans.len(), 2);
        for orphan in orphans {
            assert_eq!(orphan.suggestion.as_deref(), Some(ORPHAN_SUGGESTION));
        }
    }

    #[test]
    fn test_validate_is_deterministic() {
        let g = graph(vec![
            file("c", 3, &["a"]),
            file("a", 1, &["b"]),
            file("b", 2, &["c"]),
            file("lonely", 4, &[]),
        ]);
        let first = validate(&g);
        for _ in 0..5 {
            assert_eq!(validate(&g), first);
        }
        let lines: Vec<u32> = first.iter().map(|d| d.position.line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_clean_program_graph() {
        let g = graph(vec![
            Entity::new(
                "App",
                Position::new(1, 1),
                EntityBody::Program(Program {
                    entry: "main".into(),
                    ..Default::default()
                }),
            ),
            file("main", 2, &["util"]),
            file("util", 3, &[]),
        ]);
        assert!(validate(&g).is_empty());
        assert!(check_references(&g).is_empty());
    }

    #[test]
    fn test_unresolved_reference_warning() {
        let g = graph(vec![file("main", 1, &["nowhere"])]);
        let diagnostics = check_references(&g);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("Unresolved reference"));
    }
}
