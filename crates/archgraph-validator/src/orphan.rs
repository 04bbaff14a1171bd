//! Orphan detection
//!
//! An entity is orphaned when it is not a Program, not any Program's entry,
//! and no entity outside its strongly connected component targets any member
//! of that component. Entities that only reference each other in a closed
//! loop are therefore orphans as a group.

use crate::ValidationIssue;
use archgraph_model::{EntityGraph, EntityId, EntityKind};

/// Finds entities nothing else refers to
pub struct OrphanDetector<'g> {
    graph: &'g EntityGraph,
}

impl<'g> OrphanDetector<'g> {
    pub fn new(graph: &'g EntityGraph) -> Self {
        Self { graph }
    }

    pub fn detect_orphans(&self) -> Vec<ValidationIssue> {
        let adjacency = self.graph.resolved_adjacency();
        let components = strongly_connected_components(&adjacency);

        // A component is reached when any edge enters it from another component
        let component_count = components.iter().max().map_or(0, |max| max + 1);
        let mut reached = vec![false; component_count];
        for (source, targets) in adjacency.iter().enumerate() {
            for target in targets {
                let target = components[target.0 as usize];
                if components[source] != target {
                    reached[target] = true;
                }
            }
        }

        let entries = self.graph.program_entries();
        self.graph
            .iter()
            .enumerate()
            .filter(|(idx, entity)| {
                !reached[components[*idx]]
                    && entity.kind() != EntityKind::Program
                    && !entries.contains(entity.name.as_str())
            })
            .map(|(_, entity)| ValidationIssue::Orphan {
                name: entity.name.clone(),
                position: entity.position,
            })
            .collect()
    }
}

/// Tarjan's algorithm; returns the component index of every node
fn strongly_connected_components(adjacency: &[Vec<EntityId>]) -> Vec<usize> {
    struct Tarjan<'a> {
        adjacency: &'a [Vec<EntityId>],
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        component: Vec<usize>,
        next_index: usize,
        next_component: usize,
    }

    impl Tarjan<'_> {
        fn open(&mut self, v: usize) {
            self.index[v] = Some(self.next_index);
            self.lowlink[v] = self.next_index;
            self.next_index += 1;
            self.stack.push(v);
            self.on_stack[v] = true;
        }

        /// Explicit work stack of (node, next edge) frames in place of
        /// recursion, so long reference chains cannot exhaust the call stack
        fn connect(&mut self, root: usize) {
            let adjacency = self.adjacency;
            self.open(root);
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(&(v, cursor)) = frames.last() {
                if let Some(w) = adjacency[v].get(cursor).map(|id| id.0 as usize) {
                    if let Some(top) = frames.last_mut() {
                        top.1 += 1;
                    }
                    match self.index[w] {
                        None => {
                            self.open(w);
                            frames.push((w, 0));
                        }
                        Some(w_index) if self.on_stack[w] => {
                            self.lowlink[v] = self.lowlink[v].min(w_index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
                }
                if Some(self.lowlink[v]) == self.index[v] {
                    while let Some(w) = self.stack.pop() {
                        self.on_stack[w] = false;
                        self.component[w] = self.next_component;
                        if w == v {
                            break;
                        }
                    }
                    self.next_component += 1;
                }
            }
        }
    }

    let n = adjacency.len();
    let mut tarjan = Tarjan {
        adjacency,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        component: vec![0; n],
        next_index: 0,
        next_component: 0,
    };
    for v in 0..n {
        if tarjan.index[v].is_none() {
            tarjan.connect(v);
        }
    }
    tarjan.component
}
