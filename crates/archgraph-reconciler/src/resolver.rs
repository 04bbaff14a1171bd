//! Pass 2: Resolution
//!
//! Turns every module into canonical entities using only the registries built
//! by Pass 1. Regular modules are processed before pure-type modules. A
//! reference is kept only when the target module genuinely exports the name
//! and the declaration behind it materializes as an entity; anything else is
//! dropped without a diagnostic.

use crate::dependency::DependencyId;
use crate::descriptor::{
    ClassDescriptor, ConstantDescriptor, DeclKind, FunctionDescriptor, InterfaceDescriptor,
    ModuleDescriptor, PropertyDescriptor, TypeAliasDescriptor,
};
use crate::fusion::{plan_module, ModulePlan};
use crate::paths::{file_stem, normalize, pascal_case, strip_extension, strip_root};
use crate::registry::{ImportTarget, ModuleId, Registries};
use crate::{ReconcileError, ReconcileOptions};
use archgraph_model::{
    Class, ClassFile, Constants, Dto, DtoField, Entity, EntityBody, File, Function, Position,
    Program,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// How a local name in a module was bound by its imports
#[derive(Debug, Clone)]
enum Binding {
    /// `import { name } from "./m"` or a default import
    Entity { module: ModuleId, name: String },
    /// `import * as ns from "./m"`
    Module(ModuleId),
    /// Any binding from an external package
    External(DependencyId),
}

/// Names visible inside one module
#[derive(Debug)]
struct Scope {
    module: ModuleId,
    bindings: HashMap<String, Binding>,
}

/// A reference resolved to a canonical entity name
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    name: String,
    /// Declaration kind; `None` for files and dependencies
    kind: Option<DeclKind>,
}

/// Resolves all modules against the Pass 1 registries (Pass 2)
pub struct Resolver<'a> {
    modules: &'a [ModuleDescriptor],
    registries: &'a Registries,
    options: &'a ReconcileOptions,
    paths: Vec<String>,
    plans: Vec<ModulePlan>,
    errors: Vec<ReconcileError>,
}

impl<'a> Resolver<'a> {
    /// Plan every module's fusion strategy up front, so references into a
    /// module can be checked against what it materializes
    pub fn new(
        modules: &'a [ModuleDescriptor],
        registries: &'a Registries,
        options: &'a ReconcileOptions,
    ) -> Self {
        let paths: Vec<String> = modules.iter().map(|m| normalize(&m.file_path)).collect();
        let mut errors = Vec::new();
        let mut plans = Vec::with_capacity(modules.len());
        for (idx, module) in modules.iter().enumerate() {
            let is_entry = registries.is_entry(ModuleId(idx as u32));
            let (plan, plan_errors) = plan_module(module, &paths[idx], is_entry);
            plans.push(plan);
            errors.extend(plan_errors);
        }
        Self {
            modules,
            registries,
            options,
            paths,
            plans,
            errors,
        }
    }

    pub fn resolve(mut self) -> (Vec<Entity>, Vec<ReconcileError>) {
        // (entity, where it came from) for duplicate reporting
        let mut output: Vec<(Entity, String)> = Vec::new();

        if self.options.generate_programs {
            output.extend(self.programs());
        }

        let (regular, pure_type): (Vec<usize>, Vec<usize>) =
            (0..self.modules.len()).partition(|idx| !self.modules[*idx].is_pure_type());
        for idx in regular.into_iter().chain(pure_type) {
            let id = ModuleId(idx as u32);
            let scope = self.scope(id);
            let entities = self.module_entities(id, &scope);
            debug!(file = %self.paths[idx], entities = entities.len(), "resolved module");
            output.extend(
                entities
                    .into_iter()
                    .map(|entity| (entity, self.paths[idx].clone())),
            );
        }

        let dependencies = self
            .registries
            .dependencies
            .to_entities(&self.options.dependency_versions);
        output.extend(
            dependencies
                .into_iter()
                .zip(self.registries.dependencies.iter())
                .map(|(entity, record)| (entity, format!("package {}", record.package))),
        );

        self.check_duplicates(&output);
        let entities = output.into_iter().map(|(entity, _)| entity).collect();
        (entities, self.errors)
    }

    // === Scopes and name resolution ===

    fn scope(&self, id: ModuleId) -> Scope {
        let module = &self.modules[id.index()];
        let mut bindings = HashMap::new();

        for (index, import) in module.imports.iter().enumerate() {
            match self.registries.import_target(id, index) {
                ImportTarget::Module(target) => {
                    if let Some(local) = &import.default_binding {
                        let default = self
                            .registries
                            .exports
                            .module(target)
                            .and_then(|m| m.default.clone());
                        if let Some(name) = default {
                            bindings.insert(local.clone(), Binding::Entity { module: target, name });
                        }
                    }
                    for binding in &import.named_bindings {
                        bindings.insert(
                            binding.local_name().to_string(),
                            Binding::Entity {
                                module: target,
                                name: binding.name.clone(),
                            },
                        );
                    }
                    if let Some(local) = &import.namespace_binding {
                        bindings.insert(local.clone(), Binding::Module(target));
                    }
                }
                ImportTarget::External => {
                    let Some(dep) = self.registries.dependencies.find(&import.specifier) else {
                        continue;
                    };
                    let locals = import
                        .default_binding
                        .iter()
                        .chain(import.namespace_binding.iter())
                        .map(String::as_str)
                        .chain(import.named_bindings.iter().map(|b| b.local_name()));
                    for local in locals {
                        bindings.insert(local.to_string(), Binding::External(dep));
                    }
                }
                ImportTarget::Unresolved => {}
            }
        }

        Scope {
            module: id,
            bindings,
        }
    }

    /// `name` as exported by module `module`
    fn resolve_export(&self, module: ModuleId, name: &str) -> Option<Resolved> {
        if !self.registries.exports.exports(module, name) {
            return None;
        }
        let declared = self.registries.entities.lookup(name, module)?;
        self.plans[declared.module.index()]
            .materializes(name)
            .then(|| Resolved {
                name: name.to_string(),
                kind: Some(declared.kind),
            })
    }

    /// A name as written inside the module of `scope`
    fn resolve_name(&self, scope: &Scope, name: &str) -> Option<Resolved> {
        if let Some(declared) = self.registries.entities.local(name, scope.module) {
            return self.plans[scope.module.index()]
                .materializes(name)
                .then(|| Resolved {
                    name: name.to_string(),
                    kind: Some(declared.kind),
                });
        }

        match scope.bindings.get(name) {
            Some(Binding::Entity { module, name }) => self.resolve_export(*module, name),
            Some(Binding::Module(module)) => Some(Resolved {
                name: self.plans[module.index()].file_entity.clone(),
                kind: None,
            }),
            Some(Binding::External(dep)) => {
                self.registries.dependencies.get(*dep).map(|record| Resolved {
                    name: record.name.clone(),
                    kind: None,
                })
            }
            None => {
                // `ns.member` through a namespace import
                let (head, member) = name.split_once('.')?;
                match scope.bindings.get(head) {
                    Some(Binding::Module(module)) => self.resolve_export(*module, member),
                    _ => None,
                }
            }
        }
    }

    /// A type reference that names a DTO
    fn resolve_data(&self, scope: &Scope, type_text: &str) -> Option<String> {
        self.resolve_name(scope, unwrap_type(type_text))
            .filter(|r| r.kind.is_some_and(|k| k.is_data()))
            .map(|r| r.name)
    }

    /// A supertype reference: any resolved declaration
    fn resolve_declared(&self, scope: &Scope, name: &str) -> Option<String> {
        self.resolve_name(scope, name)
            .filter(|r| r.kind.is_some())
            .map(|r| r.name)
    }

    // === Entity construction ===

    fn module_entities(&self, id: ModuleId, scope: &Scope) -> Vec<Entity> {
        let idx = id.index();
        let module = &self.modules[idx];
        let plan = &self.plans[idx];
        let path = &self.paths[idx];
        let mut entities = Vec::new();

        let imports = self.file_imports(id);
        let exports = self.file_exports(id);
        match plan.fused_class() {
            Some(class_idx) => {
                let class = &module.classes[class_idx];
                let (extends, implements) = self.supertypes(class, scope);
                entities.push(Entity::new(
                    plan.file_entity.clone(),
                    position_at(class.line),
                    EntityBody::ClassFile(ClassFile {
                        path: path.clone(),
                        extends,
                        implements,
                        methods: self.methods(class),
                        imports,
                        exports,
                    }),
                ));
            }
            None => entities.push(Entity::new(
                plan.file_entity.clone(),
                Position::start(),
                EntityBody::File(File {
                    path: path.clone(),
                    imports,
                    exports,
                }),
            )),
        }

        for (class_idx, class) in module.classes.iter().enumerate() {
            if plan.fused_class() != Some(class_idx) {
                entities.push(self.class_entity(class, scope));
            }
        }
        for function in &module.functions {
            if plan.keeps(DeclKind::Function, function.exported) {
                entities.push(self.function_entity(function, scope));
            }
        }
        for interface in &module.interfaces {
            entities.push(interface_entity(interface));
        }
        for alias in &module.types {
            entities.push(type_alias_entity(alias));
        }
        for constant in &module.constants {
            if plan.keeps(DeclKind::Constant, constant.exported) {
                entities.push(self.constants_entity(constant, path, scope));
            }
        }
        entities
    }

    /// Canonical names a module consumes, in import order
    fn file_imports(&self, id: ModuleId) -> Vec<String> {
        let module = &self.modules[id.index()];
        let own = &self.plans[id.index()].file_entity;
        let mut imports = Vec::new();

        for (index, import) in module.imports.iter().enumerate() {
            match self.registries.import_target(id, index) {
                ImportTarget::Module(target) if target == id => {}
                ImportTarget::Module(target) => {
                    if import.is_side_effect() || import.namespace_binding.is_some() {
                        push_unique(&mut imports, &self.plans[target.index()].file_entity);
                    }
                    let default = import.default_binding.as_ref().and_then(|_| {
                        self.registries
                            .exports
                            .module(target)
                            .and_then(|m| m.default.as_deref())
                    });
                    let names = default
                        .into_iter()
                        .chain(import.named_bindings.iter().map(|b| b.name.as_str()));
                    for name in names {
                        if let Some(resolved) = self.resolve_export(target, name) {
                            push_unique(&mut imports, &resolved.name);
                        }
                    }
                }
                ImportTarget::External => {
                    let record = self
                        .registries
                        .dependencies
                        .find(&import.specifier)
                        .and_then(|dep| self.registries.dependencies.get(dep));
                    if let Some(record) = record {
                        push_unique(&mut imports, &record.name);
                    }
                }
                ImportTarget::Unresolved => {}
            }
        }
        imports.retain(|name| name != own);
        imports
    }

    /// Canonical names a module provides, from its export registry entry
    fn file_exports(&self, id: ModuleId) -> Vec<String> {
        let mut exports = Vec::new();
        if let Some(entry) = self.registries.exports.module(id) {
            for name in &entry.names {
                if let Some(resolved) = self.resolve_export(id, name) {
                    push_unique(&mut exports, &resolved.name);
                }
            }
        }
        exports
    }

    /// Single supertype goes to `extends`; several collapse into `implements`
    fn supertypes(&self, class: &ClassDescriptor, scope: &Scope) -> (Option<String>, Vec<String>) {
        let mut implements = Vec::new();
        let extends = match class.extends.as_slice() {
            [single] => self.resolve_declared(scope, single),
            several => {
                for name in several {
                    if let Some(resolved) = self.resolve_declared(scope, name) {
                        push_unique(&mut implements, &resolved);
                    }
                }
                None
            }
        };
        for name in &class.implements {
            if let Some(resolved) = self.resolve_declared(scope, name) {
                push_unique(&mut implements, &resolved);
            }
        }
        (extends, implements)
    }

    fn methods(&self, class: &ClassDescriptor) -> Vec<String> {
        let mut methods = Vec::new();
        for method in &class.methods {
            let hidden = method.is_private() || method.name == "constructor";
            if self.options.include_private_methods || !hidden {
                push_unique(&mut methods, &method.name);
            }
        }
        methods
    }

    fn class_entity(&self, class: &ClassDescriptor, scope: &Scope) -> Entity {
        let (extends, implements) = self.supertypes(class, scope);
        Entity::new(
            class.name.clone(),
            position_at(class.line),
            EntityBody::Class(Class {
                extends,
                implements,
                methods: self.methods(class),
            }),
        )
    }

    fn function_entity(&self, function: &FunctionDescriptor, scope: &Scope) -> Entity {
        let input = function
            .params
            .iter()
            .filter_map(|p| p.type_name.as_deref())
            .find_map(|t| self.resolve_data(scope, t));
        let output = function
            .return_type
            .as_deref()
            .and_then(|t| self.resolve_data(scope, t));

        let mut calls = Vec::new();
        for call in &function.calls {
            let callable = self
                .resolve_name(scope, call)
                .filter(|r| matches!(r.kind, Some(DeclKind::Function | DeclKind::Class)));
            if let Some(resolved) = callable {
                if resolved.name != function.name {
                    push_unique(&mut calls, &resolved.name);
                }
            }
        }

        Entity::new(
            function.name.clone(),
            position_at(function.line),
            EntityBody::Function(Function {
                signature: signature_of(function),
                input,
                output,
                calls,
                description: function.description.clone(),
            }),
        )
    }

    fn constants_entity(&self, constant: &ConstantDescriptor, path: &str, scope: &Scope) -> Entity {
        Entity::new(
            constant.name.clone(),
            position_at(constant.line),
            EntityBody::Constants(Constants {
                path: path.to_string(),
                schema: constant
                    .type_name
                    .as_deref()
                    .and_then(|t| self.resolve_data(scope, t)),
            }),
        )
    }

    /// One Program per entry module
    fn programs(&self) -> Vec<(Entity, String)> {
        let names = self.program_names();
        self.registries
            .entry_points
            .iter()
            .zip(names)
            .map(|(id, name)| {
                let path = &self.paths[id.index()];
                let exports = self
                    .registries
                    .exports
                    .module(*id)
                    .map(|m| m.names.clone())
                    .unwrap_or_default();
                let program = Entity::new(
                    name,
                    Position::start(),
                    EntityBody::Program(Program {
                        entry: self.plans[id.index()].file_entity.clone(),
                        version: self.options.program_version.clone(),
                        exports,
                    }),
                );
                (program, path.clone())
            })
            .collect()
    }

    /// `<Stem>Program` per entry module. Entry modules sharing a stem are
    /// named from their whole path below the source root instead, and a
    /// numeric suffix settles anything still equal.
    fn program_names(&self) -> Vec<String> {
        let entries: Vec<&str> = self
            .registries
            .entry_points
            .iter()
            .map(|id| self.paths[id.index()].as_str())
            .collect();
        let stems: Vec<String> = entries.iter().map(|p| pascal_case(file_stem(p))).collect();

        let mut taken: HashSet<String> = HashSet::new();
        let mut names = Vec::with_capacity(entries.len());
        for (&path, stem) in entries.iter().zip(&stems) {
            let base = if stems.iter().filter(|s| *s == stem).count() > 1 {
                let root = self.options.source_root.as_deref().unwrap_or("");
                let rooted = strip_root(path, root).unwrap_or(path);
                pascal_case(strip_extension(rooted))
            } else {
                stem.clone()
            };
            let mut name = format!("{base}Program");
            let mut suffix = 2;
            while taken.contains(&name) {
                name = format!("{base}{suffix}Program");
                suffix += 1;
            }
            taken.insert(name.clone());
            names.push(name);
        }
        names
    }

    /// Report every repeated entity name. Names already reported as
    /// unfusable are not reported again.
    fn check_duplicates(&mut self, output: &[(Entity, String)]) {
        let unfusable: HashSet<String> = self
            .errors
            .iter()
            .filter_map(|e| match e {
                ReconcileError::UnfusableClass { class, .. } => Some(class.clone()),
                _ => None,
            })
            .collect();

        let mut first_seen: HashMap<&str, &str> = HashMap::new();
        for (entity, origin) in output {
            match first_seen.get(entity.name.as_str()) {
                Some(first) => {
                    if !unfusable.contains(&entity.name) {
                        self.errors.push(ReconcileError::DuplicateEntityName {
                            name: entity.name.clone(),
                            first: first.to_string(),
                            second: origin.clone(),
                        });
                    }
                }
                None => {
                    first_seen.insert(&entity.name, origin);
                }
            }
        }
    }
}

fn interface_entity(interface: &InterfaceDescriptor) -> Entity {
    Entity::new(
        interface.name.clone(),
        position_at(interface.line),
        EntityBody::Dto(Dto {
            fields: fields_of(&interface.properties),
            purpose: None,
        }),
    )
}

fn type_alias_entity(alias: &TypeAliasDescriptor) -> Entity {
    let definition = collapse_whitespace(&alias.definition);
    Entity::new(
        alias.name.clone(),
        position_at(alias.line),
        EntityBody::Dto(Dto {
            fields: fields_of(&alias.properties),
            purpose: (!definition.is_empty()).then_some(definition),
        }),
    )
}

fn fields_of(properties: &[PropertyDescriptor]) -> Vec<DtoField> {
    properties
        .iter()
        .map(|p| DtoField {
            name: p.name.clone(),
            type_name: collapse_whitespace(&p.type_name),
            optional: p.optional,
            description: p.description.clone(),
        })
        .collect()
}

fn position_at(line: Option<u32>) -> Position {
    line.map_or_else(Position::start, |line| Position::new(line.max(1), 1))
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `(a: T, b) => R`; a missing return type is written `void`
pub fn signature_of(function: &FunctionDescriptor) -> String {
    let params: Vec<String> = function
        .params
        .iter()
        .map(|p| match &p.type_name {
            Some(t) => format!("{}: {}", p.name, collapse_whitespace(t)),
            None => p.name.clone(),
        })
        .collect();
    let returns = function
        .return_type
        .as_deref()
        .map(collapse_whitespace)
        .unwrap_or_else(|| "void".to_string());
    format!("({}) => {}", params.join(", "), returns)
}

/// Strip `Promise<>`, `Array<>`, `ReadonlyArray<>`, `[]` and nullable unions
/// down to the named type
pub fn unwrap_type(text: &str) -> &str {
    const WRAPPERS: &[&str] = &["Promise", "Array", "ReadonlyArray"];
    let mut current = text.trim();
    'outer: loop {
        if let Some(inner) = current.strip_suffix("[]") {
            current = inner.trim();
            continue;
        }
        for wrapper in WRAPPERS {
            let inner = current
                .strip_prefix(wrapper)
                .and_then(|rest| rest.trim_start().strip_prefix('<'))
                .and_then(|rest| rest.strip_suffix('>'));
            if let Some(inner) = inner {
                current = inner.trim();
                continue 'outer;
            }
        }
        if current.contains('|') {
            let named = current
                .split('|')
                .map(str::trim)
                .find(|part| !matches!(*part, "null" | "undefined"));
            if let Some(named) = named {
                if named != current {
                    current = named;
                    continue;
                }
            }
        }
        return current;
    }
}
