//! Reference checks
//!
//! Program entries must name File entities. Any other relationship target
//! that is not declared in the graph is reported as a warning.

use crate::ValidationIssue;
use archgraph_model::{EntityBody, EntityGraph, EntityKind};

pub struct ReferenceChecker<'g> {
    graph: &'g EntityGraph,
}

impl<'g> ReferenceChecker<'g> {
    pub fn new(graph: &'g EntityGraph) -> Self {
        Self { graph }
    }

    pub fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for entity in self.graph.iter() {
            if let EntityBody::Program(program) = &entity.body {
                if let Some(target) = self.graph.get_by_name(&program.entry) {
                    if target.kind() != EntityKind::File {
                        issues.push(ValidationIssue::InvalidEntry {
                            program: entity.name.clone(),
                            entry: program.entry.clone(),
                            kind: target.kind(),
                            position: entity.position,
                        });
                    }
                }
            }

            for reference in entity.references() {
                if !self.graph.contains(reference.target) {
                    issues.push(ValidationIssue::UnresolvedReference {
                        from: entity.name.clone(),
                        relation: reference.relation,
                        target: reference.target.to_string(),
                        position: entity.position,
                    });
                }
            }
        }
        issues
    }
}
