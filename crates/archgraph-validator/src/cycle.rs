//! Circular import detection
//!
//! Restricts the graph to File-like entities and their `imports` edges. An
//! import naming a non-file entity counts as an import of the file that
//! exports it, so entity-level imports still form file cycles.

use crate::ValidationIssue;
use archgraph_model::{EntityGraph, EntityId, Position};
use std::collections::{HashMap, HashSet};

/// Visit state for DFS cycle detection
#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    NotVisited,
    InProgress,
    Completed,
}

/// Detects circular imports between files
pub struct CycleDetector<'g> {
    graph: &'g EntityGraph,
    /// File-level import adjacency, file-like entities only
    edges: HashMap<EntityId, Vec<EntityId>>,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g EntityGraph) -> Self {
        let edges = import_edges(graph);
        Self { graph, edges }
    }

    /// Report each distinct cycle once, rotated to start at the member that
    /// comes first in source order
    pub fn detect_cycles(&self) -> Vec<ValidationIssue> {
        let mut errors = Vec::new();
        let mut seen: HashSet<Vec<EntityId>> = HashSet::new();
        let mut state: HashMap<EntityId, VisitState> = self
            .edges
            .keys()
            .map(|id| (*id, VisitState::NotVisited))
            .collect();
        let mut path: Vec<EntityId> = Vec::new();

        // DFS from each unvisited file, in source order
        for id in self.files_in_source_order() {
            if state[&id] == VisitState::NotVisited {
                self.visit(id, &mut state, &mut path, &mut seen, &mut errors);
            }
        }

        errors
    }

    /// Iterative DFS from `root`; each frame is a node and the index of its
    /// next outgoing edge, so depth is bounded by the heap, not the call stack
    fn visit(
        &self,
        root: EntityId,
        state: &mut HashMap<EntityId, VisitState>,
        path: &mut Vec<EntityId>,
        seen: &mut HashSet<Vec<EntityId>>,
        errors: &mut Vec<ValidationIssue>,
    ) {
        state.insert(root, VisitState::InProgress);
        path.push(root);
        let mut frames: Vec<(EntityId, usize)> = vec![(root, 0)];

        while let Some(&(node, cursor)) = frames.last() {
            let targets = self.edges.get(&node).map(Vec::as_slice).unwrap_or_default();
            let Some(&next) = targets.get(cursor) else {
                frames.pop();
                path.pop();
                state.insert(node, VisitState::Completed);
                continue;
            };
            if let Some(top) = frames.last_mut() {
                top.1 += 1;
            }

            match state.get(&next) {
                Some(VisitState::InProgress) => {
                    // Back edge: the cycle is the path suffix starting at `next`
                    if let Some(start) = path.iter().position(|&id| id == next) {
                        let cycle = self.canonical_rotation(&path[start..]);
                        if seen.insert(cycle.clone()) {
                            errors.push(self.cycle_issue(&cycle));
                        }
                    }
                }
                Some(VisitState::NotVisited) => {
                    state.insert(next, VisitState::InProgress);
                    path.push(next);
                    frames.push((next, 0));
                }
                _ => {} // Already completed, no cycle through this path
            }
        }
    }

    fn files_in_source_order(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.edges.keys().copied().collect();
        ids.sort_by(|a, b| self.source_key(*a).cmp(&self.source_key(*b)));
        ids
    }

    fn source_key(&self, id: EntityId) -> (Position, &str) {
        self.graph
            .get(id)
            .map_or((Position::default(), ""), |e| (e.position, e.name.as_str()))
    }

    fn canonical_rotation(&self, cycle: &[EntityId]) -> Vec<EntityId> {
        let first = (0..cycle.len())
            .min_by(|&a, &b| self.source_key(cycle[a]).cmp(&self.source_key(cycle[b])))
            .unwrap_or(0);
        cycle[first..].iter().chain(&cycle[..first]).copied().collect()
    }

    fn cycle_issue(&self, cycle: &[EntityId]) -> ValidationIssue {
        let names: Vec<&str> = cycle.iter().map(|id| self.source_key(*id).1).collect();
        let (position, first) = self.source_key(cycle[0]);
        ValidationIssue::CircularImport {
            cycle: format!("{} -> {}", names.join(" -> "), first),
            first: first.to_string(),
            position,
        }
    }
}

/// Build file-to-file import edges. Targets that are not files are mapped to
/// the file exporting them; self-edges and unknown targets are dropped.
fn import_edges(graph: &EntityGraph) -> HashMap<EntityId, Vec<EntityId>> {
    let mut owner: HashMap<&str, EntityId> = HashMap::new();
    for entity in graph.iter().filter(|e| e.kind().is_file_like()) {
        let Some(id) = graph.id_of(&entity.name) else {
            continue;
        };
        for export in entity.file_exports() {
            owner.entry(export.as_str()).or_insert(id);
        }
    }

    let mut edges = HashMap::new();
    for entity in graph.iter().filter(|e| e.kind().is_file_like()) {
        let Some(id) = graph.id_of(&entity.name) else {
            continue;
        };
        let mut targets = Vec::new();
        for import in entity.imports() {
            let target = match graph.get_by_name(import) {
                Some(t) if t.kind().is_file_like() => graph.id_of(import),
                Some(_) => owner.get(import.as_str()).copied(),
                None => None,
            };
            if let Some(target) = target {
                if target != id && !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        edges.insert(id, targets);
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_model::{Entity, EntityBody, File, Function};

    fn file(name: &str, line: u32, imports: &[&str], exports: &[&str]) -> Entity {
        Entity::new(
            name,
            Position::new(line, 1),
            EntityBody::File(File {
                path: format!("src/{name}.ts"),
                imports: imports.iter().map(|s| s.to_string()).collect(),
                exports: exports.iter().map(|s| s.to_string()).collect(),
            }),
        )
    }

    fn function(name: &str, line: u32) -> Entity {
        Entity::new(
            name,
            Position::new(line, 1),
            EntityBody::Function(Function {
                signature: "() => void".into(),
                ..Default::default()
            }),
        )
    }

    fn detect(entities: Vec<Entity>) -> Vec<ValidationIssue> {
        let (graph, _) = EntityGraph::from_entities(entities);
        CycleDetector::new(&graph).detect_cycles()
    }

    fn cycle_text(issue: &ValidationIssue) -> &str {
        match issue {
            ValidationIssue::CircularImport { cycle, .. } => cycle,
            other => panic!("Expected CircularImport, got {other:?}"),
        }
    }

    #[test]
    fn test_no_cycle() {
        let errors = detect(vec![file("a", 1, &["b"], &[]), file("b", 2, &[], &[])]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_self_import_ignored() {
        let errors = detect(vec![file("a", 1, &["a"], &[])]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let errors = detect(vec![file("a", 1, &["b"], &[]), file("b", 2, &["a"], &[])]);
        assert_eq!(errors.len(), 1);
        assert_eq!(cycle_text(&errors[0]), "a -> b -> a");
        assert_eq!(errors[0].position(), Position::new(1, 1));
    }

    #[test]
    fn test_cycle_starts_at_first_file_in_source_order() {
        // c is declared first, so the cycle is reported from c
        let errors = detect(vec![
            file("a", 5, &["b"], &[]),
            file("b", 9, &["c"], &[]),
            file("c", 1, &["a"], &[]),
        ]);
        assert_eq!(errors.len(), 1);
        assert_eq!(cycle_text(&errors[0]), "c -> a -> b -> c");
        assert_eq!(errors[0].anchor(), "c");
    }

    #[test]
    fn test_two_distinct_cycles() {
        let errors = detect(vec![
            file("a", 1, &["b"], &[]),
            file("b", 2, &["a"], &[]),
            file("c", 3, &["d"], &[]),
            file("d", 4, &["c"], &[]),
        ]);
        assert_eq!(errors.len(), 2);
        assert_eq!(cycle_text(&errors[0]), "a -> b -> a");
        assert_eq!(cycle_text(&errors[1]), "c -> d -> c");
    }

    #[test]
    fn test_entity_imports_map_to_owning_file() {
        // a imports the function `load` exported by b, b imports `save` from a
        let errors = detect(vec![
            file("a", 1, &["load"], &["save"]),
            file("b", 2, &["save"], &["load"]),
            function("load", 3),
            function("save", 4),
        ]);
        assert_eq!(errors.len(), 1);
        assert_eq!(cycle_text(&errors[0]), "a -> b -> a");
    }

    #[test]
    fn test_long_import_chain() {
        const LEN: usize = 20_000;
        let names: Vec<String> = (0..LEN).map(|i| format!("f{i:05}")).collect();
        let entities: Vec<Entity> = (0..LEN)
            .map(|i| {
                let next = names[(i + 1) % LEN].as_str();
                file(&names[i], i as u32 + 1, &[next], &[])
            })
            .collect();

        let errors = detect(entities);
        assert_eq!(errors.len(), 1);
        let text = cycle_text(&errors[0]);
        assert!(text.starts_with("f00000 -> f00001 -> "));
        assert!(text.ends_with("f19999 -> f00000"));
    }

    #[test]
    fn test_non_file_entities_ignored() {
        let errors = detect(vec![function("f", 1), file("a", 2, &["f"], &[])]);
        assert!(errors.is_empty());
    }
}
