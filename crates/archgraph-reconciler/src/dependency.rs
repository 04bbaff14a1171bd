//! External dependency arena
//!
//! One record per package root, created on first encounter and never removed
//! within a run. Records are addressed by stable [`DependencyId`]s.

use crate::paths::{package_root, pascal_case};
use archgraph_model::{Dependency, Entity, EntityBody, Position};
use std::collections::{BTreeMap, HashMap};

/// Purposes of packages common enough to describe by name
const KNOWN_PURPOSES: &[(&str, &str)] = &[
    ("react", "UI component library"),
    ("react-dom", "DOM rendering for React"),
    ("vue", "UI component framework"),
    ("@angular/core", "Application framework"),
    ("svelte", "UI component compiler"),
    ("express", "HTTP server framework"),
    ("fastify", "HTTP server framework"),
    ("koa", "HTTP server framework"),
    ("axios", "HTTP client"),
    ("node-fetch", "HTTP client"),
    ("lodash", "Utility functions"),
    ("underscore", "Utility functions"),
    ("ramda", "Functional utilities"),
    ("rxjs", "Reactive streams"),
    ("zod", "Schema validation"),
    ("yup", "Schema validation"),
    ("joi", "Schema validation"),
    ("commander", "Command-line argument parsing"),
    ("yargs", "Command-line argument parsing"),
    ("chalk", "Terminal string styling"),
    ("dotenv", "Environment variable loading"),
    ("uuid", "UUID generation"),
    ("dayjs", "Date manipulation"),
    ("moment", "Date manipulation"),
    ("date-fns", "Date manipulation"),
    ("winston", "Logging"),
    ("pino", "Logging"),
    ("jest", "Testing framework"),
    ("vitest", "Testing framework"),
    ("mocha", "Testing framework"),
    ("prisma", "Database ORM"),
    ("@prisma/client", "Database client"),
    ("typeorm", "Database ORM"),
    ("mongoose", "MongoDB object modeling"),
    ("pg", "PostgreSQL client"),
    ("redis", "Redis client"),
    ("ws", "WebSocket implementation"),
    ("socket.io", "Real-time communication"),
    ("typescript", "TypeScript compiler API"),
    ("fs", "File system access"),
    ("path", "File path manipulation"),
    ("http", "HTTP networking"),
    ("https", "HTTPS networking"),
    ("crypto", "Cryptographic primitives"),
    ("events", "Event emitter"),
    ("child_process", "Child process management"),
    ("os", "Operating system information"),
    ("url", "URL parsing"),
    ("util", "Node.js utilities"),
    ("stream", "Stream handling"),
];

/// Human-readable purpose of a package
pub fn purpose_of(package: &str) -> String {
    KNOWN_PURPOSES
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, purpose)| purpose.to_string())
        .unwrap_or_else(|| format!("External dependency: {package}"))
}

/// Stable index into a [`DependencyArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Package root, e.g. `@scope/pkg`
    pub package: String,
    /// Canonical entity name
    pub name: String,
    pub purpose: String,
    /// Names imported from the package, first-seen order
    pub exports: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct DependencyArena {
    records: Vec<DependencyRecord>,
    by_package: HashMap<String, DependencyId>,
}

impl DependencyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for the package of `specifier`, creating it on first encounter
    pub fn intern(&mut self, specifier: &str) -> DependencyId {
        let package = package_root(specifier);
        if let Some(id) = self.by_package.get(&package) {
            return *id;
        }
        let id = DependencyId(self.records.len() as u32);
        self.records.push(DependencyRecord {
            name: self.unique_name(&package),
            purpose: purpose_of(&package),
            package: package.clone(),
            exports: Vec::new(),
        });
        self.by_package.insert(package, id);
        id
    }

    /// PascalCase package name; packages that fold to the same name
    /// (`@a/utils` and `a-utils`) get a numeric suffix, first one bare
    fn unique_name(&self, package: &str) -> String {
        let base = pascal_case(package);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.records.iter().any(|r| r.name == name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        name
    }

    pub fn add_export(&mut self, id: DependencyId, name: &str) {
        if let Some(record) = self.records.get_mut(id.0 as usize) {
            if !record.exports.iter().any(|e| e == name) {
                record.exports.push(name.to_string());
            }
        }
    }

    pub fn get(&self, id: DependencyId) -> Option<&DependencyRecord> {
        self.records.get(id.0 as usize)
    }

    /// Look up an existing record without creating one
    pub fn find(&self, specifier: &str) -> Option<DependencyId> {
        self.by_package.get(&package_root(specifier)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Materialize every record as a Dependency entity, arena order
    pub fn to_entities(&self, versions: &BTreeMap<String, String>) -> Vec<Entity> {
        self.records
            .iter()
            .map(|record| {
                Entity::new(
                    record.name.clone(),
                    Position::start(),
                    EntityBody::Dependency(Dependency {
                        purpose: record.purpose.clone(),
                        version: versions.get(&record.package).cloned(),
                        exports: record.exports.clone(),
                    }),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates_by_package() {
        let mut arena = DependencyArena::new();
        let a = arena.intern("lodash");
        let b = arena.intern("lodash/debounce");
        let c = arena.intern("@angular/core");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(c).unwrap().name, "AngularCore");
        assert_eq!(arena.find("lodash/fp"), Some(a));
    }

    #[test]
    fn test_colliding_package_names_get_suffix() {
        let mut arena = DependencyArena::new();
        let scoped = arena.intern("@a/utils");
        let plain = arena.intern("a-utils");
        let third = arena.intern("a_utils");
        assert_eq!(arena.get(scoped).unwrap().name, "AUtils");
        assert_eq!(arena.get(plain).unwrap().name, "AUtils2");
        assert_eq!(arena.get(third).unwrap().name, "AUtils3");
        assert_eq!(arena.intern("a-utils/sub"), plain);
    }

    #[test]
    fn test_purpose_fallback() {
        assert_eq!(purpose_of("lodash"), "Utility functions");
        assert_eq!(purpose_of("left-pad"), "External dependency: left-pad");
    }

    #[test]
    fn test_exports_first_seen_order() {
        let mut arena = DependencyArena::new();
        let id = arena.intern("lodash");
        arena.add_export(id, "debounce");
        arena.add_export(id, "throttle");
        arena.add_export(id, "debounce");

        let mut versions = BTreeMap::new();
        versions.insert("lodash".to_string(), "4.17.21".to_string());
        let entities = arena.to_entities(&versions);
        assert_eq!(entities.len(), 1);
        match &entities[0].body {
            EntityBody::Dependency(dep) => {
                assert_eq!(dep.exports, vec!["debounce", "throttle"]);
                assert_eq!(dep.version.as_deref(), Some("4.17.21"));
            }
            other => panic!("expected dependency, got {other:?}"),
        }
    }
}
