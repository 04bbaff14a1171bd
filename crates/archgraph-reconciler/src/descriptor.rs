//! Per-module descriptors produced by an external source analyzer
//!
//! One [`ModuleDescriptor`] describes a single source module: what it imports,
//! what it exports and what it declares. Field names follow the analyzer's
//! camelCase JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub file_path: String,
    #[serde(default)]
    pub imports: Vec<ImportDescriptor>,
    #[serde(default)]
    pub exports: Vec<ExportDescriptor>,
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeAliasDescriptor>,
    #[serde(default)]
    pub constants: Vec<ConstantDescriptor>,
}

impl ModuleDescriptor {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// Declares only interfaces, type aliases and constants
    pub fn is_pure_type(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && (!self.interfaces.is_empty() || !self.types.is_empty() || !self.constants.is_empty())
    }

    /// Every declared name with its declaration kind, in declaration order
    pub fn declarations(&self) -> impl Iterator<Item = (&str, DeclKind, bool)> {
        let functions = self
            .functions
            .iter()
            .map(|f| (f.name.as_str(), DeclKind::Function, f.exported));
        let classes = self
            .classes
            .iter()
            .map(|c| (c.name.as_str(), DeclKind::Class, c.exported));
        let interfaces = self
            .interfaces
            .iter()
            .map(|i| (i.name.as_str(), DeclKind::Interface, i.exported));
        let types = self
            .types
            .iter()
            .map(|t| (t.name.as_str(), DeclKind::TypeAlias, t.exported));
        let constants = self
            .constants
            .iter()
            .map(|c| (c.name.as_str(), DeclKind::Constant, c.exported));
        functions
            .chain(classes)
            .chain(interfaces)
            .chain(types)
            .chain(constants)
    }
}

/// Kind of a top-level declaration inside a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    Class,
    Interface,
    TypeAlias,
    Constant,
}

impl DeclKind {
    /// Interfaces and type aliases become DTO entities
    pub fn is_data(&self) -> bool {
        matches!(self, DeclKind::Interface | DeclKind::TypeAlias)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDescriptor {
    pub specifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_binding: Option<String>,
    #[serde(default)]
    pub named_bindings: Vec<NamedBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_binding: Option<String>,
}

impl ImportDescriptor {
    /// `import "./polyfill"` style, no bindings at all
    pub fn is_side_effect(&self) -> bool {
        self.default_binding.is_none()
            && self.named_bindings.is_empty()
            && self.namespace_binding.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedBinding {
    /// Name exported by the source module
    pub name: String,
    /// Local name, when renamed with `as`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl NamedBinding {
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDescriptor {
    /// Exported name; `*` for `export * from`
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    /// Declaration kind as reported by the analyzer, e.g. "function"
    #[serde(default)]
    pub kind: String,
    /// Source specifier of a re-export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Names invoked from the body
    #[serde(default)]
    pub calls: Vec<String>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: String,
    /// "public", "protected" or "private"
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub is_static: bool,
}

fn default_visibility() -> String {
    "public".to_string()
}

impl MethodDescriptor {
    pub fn is_private(&self) -> bool {
        self.visibility == "private" || self.name.starts_with('#')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDescriptor {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDescriptor {
    pub name: String,
    /// Right-hand side of the alias as written
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantDescriptor {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}
