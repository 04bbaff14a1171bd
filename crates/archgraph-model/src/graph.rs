//! Entity graph data structure

use crate::{Entity, EntityKind, GraphError, Reference, Relation};
use std::collections::{HashMap, HashSet};

/// Stable index of an entity within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// A flat name-to-entity map; adjacency is computed on demand
#[derive(Debug, Default, Clone)]
pub struct EntityGraph {
    /// All entities in insertion order
    entities: Vec<Entity>,

    /// Name to ID mapping for lookup
    by_name: HashMap<String, EntityId>,
}

impl EntityGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of entities, collecting every duplicate name.
    /// The first declaration of a name wins.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> (Self, Vec<GraphError>) {
        let mut graph = Self::new();
        let mut errors = Vec::new();
        for entity in entities {
            if let Err(e) = graph.insert(entity) {
                errors.push(e);
            }
        }
        (graph, errors)
    }

    /// Insert a new entity, returning error if the name is taken
    pub fn insert(&mut self, entity: Entity) -> Result<EntityId, GraphError> {
        if let Some(existing) = self.get_by_name(&entity.name) {
            return Err(GraphError::DuplicateName {
                name: entity.name.clone(),
                position: entity.position,
                previous: existing.position,
            });
        }

        let id = EntityId(self.entities.len() as u32);
        self.by_name.insert(entity.name.clone(), id);
        self.entities.push(entity);
        Ok(id)
    }

    /// Get an entity by name
    pub fn get_by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name
            .get(name)
            .map(|id| &self.entities[id.0 as usize])
    }

    /// Get an entity by ID
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    /// Get the ID for an entity name
    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterate over all entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entity names
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.by_name.keys()
    }

    /// Entities of one kind, in insertion order
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    /// Outgoing edges of an entity
    pub fn outgoing(&self, name: &str) -> Vec<Reference<'_>> {
        self.get_by_name(name)
            .map(|e| e.references())
            .unwrap_or_default()
    }

    /// Incoming edges of an entity as `(source name, relation)` pairs
    pub fn incoming(&self, name: &str) -> Vec<(&str, Relation)> {
        self.entities
            .iter()
            .flat_map(|source| {
                source
                    .references()
                    .into_iter()
                    .filter(|r| r.target == name)
                    .map(move |r| (source.name.as_str(), r.relation))
            })
            .collect()
    }

    /// Names every Program designates as its entry
    pub fn program_entries(&self) -> HashSet<&str> {
        self.entities
            .iter()
            .filter_map(|e| match &e.body {
                crate::EntityBody::Program(p) => Some(p.entry.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Outgoing edges that point at entities inside this graph, keyed by ID
    pub fn resolved_adjacency(&self) -> Vec<Vec<EntityId>> {
        self.entities
            .iter()
            .map(|e| {
                e.references()
                    .into_iter()
                    .filter_map(|r| self.id_of(r.target))
                    .collect()
            })
            .collect()
    }
}
