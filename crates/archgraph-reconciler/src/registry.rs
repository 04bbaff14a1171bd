//! Pass 1: Collection
//!
//! Observes every module once and builds the registries that Pass 2 reads:
//! which spellings name which module and what each module exports, every
//! declaration by name, and the external dependency arena. Nothing here
//! resolves a cross-module reference to an entity.

use crate::dependency::{DependencyArena, DependencyId};
use crate::descriptor::{DeclKind, ImportDescriptor, ModuleDescriptor};
use crate::paths::{file_stem, is_relative, join, normalize, spellings, strip_extension};
use crate::{ReconcileError, ReconcileOptions};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Index of a module in the path-sorted module list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What one module provides to importers
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    /// Normalized file path
    pub path: String,
    /// Exported names, declaration order, `export *` expanded
    pub names: Vec<String>,
    /// Name bound by `export default`
    pub default: Option<String>,
}

impl ModuleExports {
    pub fn exports(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn add(&mut self, name: &str) -> bool {
        if self.exports(name) {
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }
}

/// Where an import specifier points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Module(ModuleId),
    External,
    Unresolved,
}

/// Specifier-keyed index of what each module provides
#[derive(Debug, Default)]
pub struct ExportRegistry {
    modules: Vec<ModuleExports>,
    /// Path-based spellings
    specifiers: HashMap<String, ModuleId>,
    /// Bare file stems; a weaker claim than a path spelling
    stems: HashMap<String, ModuleId>,
    aliases: Vec<(String, String)>,
}

impl ExportRegistry {
    pub fn module(&self, id: ModuleId) -> Option<&ModuleExports> {
        self.modules.get(id.index())
    }

    /// Module named by a path spelling, else by a bare file stem
    pub fn lookup(&self, spelling: &str) -> Option<ModuleId> {
        self.specifiers
            .get(spelling)
            .or_else(|| self.stems.get(spelling))
            .copied()
    }

    /// Whether module `id` genuinely exports `name`
    pub fn exports(&self, id: ModuleId, name: &str) -> bool {
        self.module(id).is_some_and(|m| m.exports(name))
    }

    /// Resolve a specifier without knowing what is imported through it.
    /// A bare specifier only reaches a local module through a path spelling.
    pub fn resolve(&self, importer: &str, specifier: &str) -> ImportTarget {
        self.resolve_with(importer, specifier, |_| false)
    }

    /// Resolve the specifier of `import`. A bare specifier that only matches
    /// a local file stem names that module when the module provides every
    /// binding the import asks for; otherwise it is a package.
    pub fn resolve_import(&self, importer: &str, import: &ImportDescriptor) -> ImportTarget {
        self.resolve_with(importer, &import.specifier, |module| {
            let wants_default = import.default_binding.is_some();
            (wants_default || !import.named_bindings.is_empty())
                && (!wants_default || module.default.is_some())
                && import.named_bindings.iter().all(|b| module.exports(&b.name))
        })
    }

    /// Resolve the source of `export { name } from "..."`
    pub fn resolve_re_export(&self, importer: &str, source: &str, name: &str) -> ImportTarget {
        self.resolve_with(importer, source, |module| name != "*" && module.exports(name))
    }

    fn resolve_with(
        &self,
        importer: &str,
        specifier: &str,
        provides: impl Fn(&ModuleExports) -> bool,
    ) -> ImportTarget {
        if specifier.starts_with("node:") {
            return ImportTarget::External;
        }
        if is_relative(specifier) {
            return self.lookup_path(&join(importer, specifier));
        }
        for (prefix, target) in &self.aliases {
            if let Some(rest) = specifier.strip_prefix(prefix.as_str()) {
                return self.lookup_path(&normalize(&format!("{target}{rest}")));
            }
        }
        if let Some(id) = self.specifiers.get(specifier) {
            return ImportTarget::Module(*id);
        }
        match self.stems.get(specifier) {
            Some(id) if self.module(*id).is_some_and(&provides) => ImportTarget::Module(*id),
            _ => ImportTarget::External,
        }
    }

    fn lookup_path(&self, path: &str) -> ImportTarget {
        self.specifiers
            .get(path)
            .or_else(|| self.specifiers.get(strip_extension(path)))
            .map_or(ImportTarget::Unresolved, |id| ImportTarget::Module(*id))
    }

    // First writer wins in both maps
    fn register(&mut self, spelling: String, id: ModuleId) {
        self.specifiers.entry(spelling).or_insert(id);
    }

    fn register_stem(&mut self, stem: &str, id: ModuleId) {
        self.stems.entry(stem.to_string()).or_insert(id);
    }
}

/// One declaration as recorded in Pass 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    pub module: ModuleId,
    pub kind: DeclKind,
    pub exported: bool,
}

/// Every declaration by name, unresolved
#[derive(Debug, Default)]
pub struct EntityRegistry {
    by_name: HashMap<String, Vec<Declared>>,
}

impl EntityRegistry {
    fn record(&mut self, name: &str, declared: Declared) {
        self.by_name.entry(name.to_string()).or_default().push(declared);
    }

    pub fn get(&self, name: &str) -> &[Declared] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The declaration `name` most likely refers to when reached through
    /// module `via`: one declared there, else the first exported one
    pub fn lookup(&self, name: &str, via: ModuleId) -> Option<&Declared> {
        let candidates = self.get(name);
        candidates
            .iter()
            .find(|d| d.module == via)
            .or_else(|| candidates.iter().find(|d| d.exported))
    }

    /// A declaration of `name` inside module `id`
    pub fn local(&self, name: &str, id: ModuleId) -> Option<&Declared> {
        self.get(name).iter().find(|d| d.module == id)
    }
}

/// Everything Pass 1 learned; read-only input to Pass 2
#[derive(Debug, Default)]
pub struct Registries {
    pub exports: ExportRegistry,
    pub entities: EntityRegistry,
    pub dependencies: DependencyArena,
    /// Entry modules, module order
    pub entry_points: Vec<ModuleId>,
    /// Target of every import, per module in import order; decided once
    /// here so Pass 2 never re-resolves against a different export state
    pub import_targets: Vec<Vec<ImportTarget>>,
}

impl Registries {
    pub fn is_entry(&self, id: ModuleId) -> bool {
        self.entry_points.contains(&id)
    }

    /// Where the `index`-th import of module `id` points
    pub fn import_target(&self, id: ModuleId, index: usize) -> ImportTarget {
        self.import_targets
            .get(id.index())
            .and_then(|targets| targets.get(index))
            .copied()
            .unwrap_or(ImportTarget::Unresolved)
    }
}

/// Builds the registries from path-sorted modules (Pass 1)
pub struct Collector<'o> {
    options: &'o ReconcileOptions,
    errors: Vec<ReconcileError>,
}

impl<'o> Collector<'o> {
    pub fn new(options: &'o ReconcileOptions) -> Self {
        Self {
            options,
            errors: Vec::new(),
        }
    }

    pub fn collect(mut self, modules: &[ModuleDescriptor]) -> (Registries, Vec<ReconcileError>) {
        let mut registries = Registries::default();
        let paths: Vec<String> = modules.iter().map(|m| normalize(&m.file_path)).collect();

        self.register_spellings(&mut registries.exports, &paths);
        self.record_declarations(&mut registries, modules);
        let imported = self.collect_exports_and_imports(&mut registries, modules, &paths);
        registries.entry_points = self.detect_entry_points(&registries.exports, &paths, &imported);

        debug!(
            modules = modules.len(),
            spellings = registries.exports.specifiers.len() + registries.exports.stems.len(),
            dependencies = registries.dependencies.len(),
            entry_points = registries.entry_points.len(),
            "collected registries"
        );
        (registries, self.errors)
    }

    fn register_spellings(&self, exports: &mut ExportRegistry, paths: &[String]) {
        let mut aliases: Vec<(String, String)> = self
            .options
            .path_aliases
            .iter()
            .map(|(prefix, target)| (prefix.clone(), target.clone()))
            .collect();
        // Longest prefix first
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        exports.aliases = aliases;

        let root = self.options.source_root.as_deref();
        for (idx, path) in paths.iter().enumerate() {
            exports.modules.push(ModuleExports {
                path: path.clone(),
                ..Default::default()
            });
            for spelling in spellings(path, root) {
                exports.register(spelling, ModuleId(idx as u32));
            }
        }
        for (idx, path) in paths.iter().enumerate() {
            exports.register_stem(file_stem(path), ModuleId(idx as u32));
        }
    }

    fn record_declarations(&self, registries: &mut Registries, modules: &[ModuleDescriptor]) {
        for (idx, module) in modules.iter().enumerate() {
            for (name, kind, exported) in module.declarations() {
                registries.entities.record(
                    name,
                    Declared {
                        module: ModuleId(idx as u32),
                        kind,
                        exported,
                    },
                );
            }
        }
    }

    /// Fill export lists, intern dependencies, and return which modules are
    /// imported by some other module
    fn collect_exports_and_imports(
        &mut self,
        registries: &mut Registries,
        modules: &[ModuleDescriptor],
        paths: &[String],
    ) -> Vec<bool> {
        let mut imported = vec![false; modules.len()];
        let mut star_edges: Vec<(ModuleId, ModuleId)> = Vec::new();

        // Every name a module states it exports is known before any
        // specifier is resolved, so stem matches do not depend on order
        for (idx, module) in modules.iter().enumerate() {
            let entry = &mut registries.exports.modules[idx];
            for export in module.exports.iter().filter(|e| e.name != "*") {
                entry.add(&export.name);
                if export.is_default && export.source.is_none() {
                    entry.default = Some(export.name.clone());
                }
            }
        }

        for (idx, module) in modules.iter().enumerate() {
            let id = ModuleId(idx as u32);
            let path = &paths[idx];

            for export in &module.exports {
                let Some(source) = &export.source else {
                    continue;
                };

                // Re-exports count as imports of their source
                match registries.exports.resolve_re_export(path, source, &export.name) {
                    ImportTarget::Module(target) => {
                        if target != id {
                            imported[target.index()] = true;
                        }
                        if export.name == "*" {
                            star_edges.push((id, target));
                        }
                    }
                    ImportTarget::External => {
                        let dep = registries.dependencies.intern(source);
                        if export.name != "*" {
                            registries.dependencies.add_export(dep, &export.name);
                        }
                    }
                    ImportTarget::Unresolved => {
                        warn!(file = %path, source = %source, "re-export source not found");
                        self.errors.push(ReconcileError::UnresolvedReExport {
                            file: path.clone(),
                            source_specifier: source.clone(),
                        });
                    }
                }
            }

            let mut targets = Vec::with_capacity(module.imports.len());
            for import in &module.imports {
                let target = registries.exports.resolve_import(path, import);
                match target {
                    ImportTarget::Module(target) => {
                        if target != id {
                            imported[target.index()] = true;
                        }
                    }
                    ImportTarget::External => {
                        let dep = registries.dependencies.intern(&import.specifier);
                        add_dependency_exports(&mut registries.dependencies, dep, import);
                    }
                    ImportTarget::Unresolved => {
                        debug!(file = %path, specifier = %import.specifier, "import not found");
                    }
                }
                targets.push(target);
            }
            registries.import_targets.push(targets);
        }

        expand_star_exports(&mut registries.exports, &star_edges);
        imported
    }

    fn detect_entry_points(
        &mut self,
        exports: &ExportRegistry,
        paths: &[String],
        imported: &[bool],
    ) -> Vec<ModuleId> {
        if self.options.entry_points.is_empty() {
            return paths
                .iter()
                .enumerate()
                .filter(|(idx, path)| {
                    matches!(file_stem(path), "main" | "index" | "cli") && !imported[*idx]
                })
                .map(|(idx, _)| ModuleId(idx as u32))
                .collect();
        }

        let mut entries = Vec::new();
        for entry in &self.options.entry_points {
            let normalized = normalize(entry);
            let found = paths
                .iter()
                .position(|p| *p == normalized || strip_extension(p) == normalized)
                .map(|idx| ModuleId(idx as u32))
                .or_else(|| exports.lookup(&normalized));
            match found {
                Some(id) if !entries.contains(&id) => entries.push(id),
                Some(_) => {}
                None => {
                    warn!(entry = %entry, "entry point not found");
                    self.errors.push(ReconcileError::EntryPointNotFound {
                        entry: entry.clone(),
                    });
                }
            }
        }
        entries.sort();
        entries
    }
}

fn add_dependency_exports(
    arena: &mut DependencyArena,
    dep: DependencyId,
    import: &ImportDescriptor,
) {
    if let Some(default) = &import.default_binding {
        arena.add_export(dep, default);
    }
    for binding in &import.named_bindings {
        arena.add_export(dep, &binding.name);
    }
}

/// Propagate `export * from` edges until nothing changes
fn expand_star_exports(exports: &mut ExportRegistry, edges: &[(ModuleId, ModuleId)]) {
    if edges.is_empty() {
        return;
    }
    // Each round settles at least one more level of re-export chains
    for _ in 0..=exports.modules.len() {
        let mut changed = false;
        for &(module, source) in edges {
            let names: Vec<String> = exports.modules[source.index()]
                .names
                .iter()
                .filter(|name| exports.modules[source.index()].default.as_deref() != Some(name.as_str()))
                .cloned()
                .collect();
            for name in names {
                changed |= exports.modules[module.index()].add(&name);
            }
        }
        if !changed {
            break;
        }
    }
}
