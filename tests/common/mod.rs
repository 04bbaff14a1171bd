//! Shared fixtures for integration tests

#![allow(dead_code)]

use archgraph::model::{Entity, EntityKind};
use archgraph::reconciler::{
    ClassDescriptor, ExportDescriptor, FunctionDescriptor, ImportDescriptor, InterfaceDescriptor,
    MethodDescriptor, ModuleDescriptor, NamedBinding, ParamDescriptor, PropertyDescriptor,
    ReconcileOptions,
};

/// Fluent builder for module descriptors. Exported declarations also get an
/// export entry, the way an analyzer reports them.
pub struct ModuleBuilder {
    module: ModuleDescriptor,
}

impl ModuleBuilder {
    pub fn new(path: &str) -> Self {
        Self {
            module: ModuleDescriptor::new(path),
        }
    }

    pub fn import(mut self, specifier: &str, names: &[&str]) -> Self {
        self.module.imports.push(ImportDescriptor {
            specifier: specifier.into(),
            named_bindings: names
                .iter()
                .map(|name| NamedBinding {
                    name: name.to_string(),
                    alias: None,
                })
                .collect(),
            ..Default::default()
        });
        self
    }

    pub fn namespace_import(mut self, specifier: &str, namespace: &str) -> Self {
        self.module.imports.push(ImportDescriptor {
            specifier: specifier.into(),
            namespace_binding: Some(namespace.into()),
            ..Default::default()
        });
        self
    }

    fn export(mut self, name: &str, kind: &str) -> Self {
        self.module.exports.push(ExportDescriptor {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        });
        self
    }

    pub fn re_export(mut self, name: &str, source: &str) -> Self {
        self.module.exports.push(ExportDescriptor {
            name: name.into(),
            kind: "function".into(),
            source: Some(source.into()),
            ..Default::default()
        });
        self
    }

    /// An exported function
    pub fn function(self, name: &str, calls: &[&str]) -> Self {
        self.typed_function(name, &[], None, calls)
    }

    pub fn typed_function(
        mut self,
        name: &str,
        params: &[(&str, &str)],
        returns: Option<&str>,
        calls: &[&str],
    ) -> Self {
        self.module.functions.push(FunctionDescriptor {
            name: name.into(),
            params: params
                .iter()
                .map(|(name, type_name)| ParamDescriptor {
                    name: name.to_string(),
                    type_name: Some(type_name.to_string()),
                })
                .collect(),
            return_type: returns.map(str::to_string),
            calls: calls.iter().map(|c| c.to_string()).collect(),
            exported: true,
            ..Default::default()
        });
        self.export(name, "function")
    }

    /// A function that is not exported
    pub fn local_function(mut self, name: &str, calls: &[&str]) -> Self {
        self.module.functions.push(FunctionDescriptor {
            name: name.into(),
            calls: calls.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    /// An exported class with public methods
    pub fn class(mut self, name: &str, methods: &[&str]) -> Self {
        self.module.classes.push(ClassDescriptor {
            name: name.into(),
            methods: methods
                .iter()
                .map(|m| MethodDescriptor {
                    name: m.to_string(),
                    visibility: "public".into(),
                    is_static: false,
                })
                .collect(),
            exported: true,
            ..Default::default()
        });
        self.export(name, "class")
    }

    /// An exported interface; fields are `(name, type, optional)`
    pub fn interface(mut self, name: &str, fields: &[(&str, &str, bool)]) -> Self {
        self.module.interfaces.push(InterfaceDescriptor {
            name: name.into(),
            properties: fields
                .iter()
                .map(|(name, type_name, optional)| PropertyDescriptor {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    optional: *optional,
                    description: None,
                })
                .collect(),
            exported: true,
            ..Default::default()
        });
        self.export(name, "interface")
    }

    pub fn build(self) -> ModuleDescriptor {
        self.module
    }
}

/// A small application: an entry module, a service module organized around
/// its class, and one external package.
pub fn sample_project() -> Vec<ModuleDescriptor> {
    vec![
        ModuleBuilder::new("src/services/user-service.ts")
            .class("UserService", &["constructor", "getUser", "saveUser"])
            .interface("User", &[("id", "string", false), ("email", "string", true)])
            .typed_function("findUser", &[("id", "string")], Some("Promise<User>"), &[])
            .build(),
        ModuleBuilder::new("src/main.ts")
            .import("./services/user-service", &["UserService"])
            .import("lodash", &["debounce"])
            .function("bootstrap", &["UserService", "debounce"])
            .build(),
    ]
}

pub fn sample_options() -> ReconcileOptions {
    let mut options = ReconcileOptions::with_programs();
    options.program_version = Some("1.0.0".into());
    options
        .dependency_versions
        .insert("lodash".into(), "4.17.21".into());
    options
}

/// Find an entity by name or fail the test
pub fn entity<'a>(entities: &'a [Entity], name: &str) -> &'a Entity {
    entities
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("Expected entity named {name}"))
}

pub fn assert_kind(entities: &[Entity], name: &str, kind: EntityKind) {
    assert_eq!(entity(entities, name).kind(), kind, "kind of {name}");
}

pub fn names(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(|e| e.name.as_str()).collect()
}
