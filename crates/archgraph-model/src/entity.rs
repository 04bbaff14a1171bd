//! Entity kinds and their attributes

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity in the architecture graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Program,
    Dependency,
    File,
    ClassFile,
    Class,
    Function,
    #[serde(rename = "DTO")]
    Dto,
    Constants,
    Asset,
    UIComponent,
    RunParameter,
}

impl EntityKind {
    /// All kinds, in canonical rendering order
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Program,
        EntityKind::Dependency,
        EntityKind::File,
        EntityKind::ClassFile,
        EntityKind::Class,
        EntityKind::Function,
        EntityKind::Dto,
        EntityKind::Constants,
        EntityKind::Asset,
        EntityKind::UIComponent,
        EntityKind::RunParameter,
    ];

    /// Keyword that opens a declaration of this kind in design text
    pub fn keyword(&self) -> &'static str {
        match self {
            EntityKind::Program => "program",
            EntityKind::Dependency => "dependency",
            EntityKind::File => "file",
            EntityKind::ClassFile => "classfile",
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::Dto => "dto",
            EntityKind::Constants => "constants",
            EntityKind::Asset => "asset",
            EntityKind::UIComponent => "uicomponent",
            EntityKind::RunParameter => "runparameter",
        }
    }

    /// Section header under which entities of this kind are rendered
    pub fn section_title(&self) -> &'static str {
        match self {
            EntityKind::Program => "Programs",
            EntityKind::Dependency => "Dependencies",
            EntityKind::File => "Files",
            EntityKind::ClassFile => "ClassFiles",
            EntityKind::Class => "Classes",
            EntityKind::Function => "Functions",
            EntityKind::Dto => "DTOs",
            EntityKind::Constants => "Constants",
            EntityKind::Asset => "Assets",
            EntityKind::UIComponent => "UIComponents",
            EntityKind::RunParameter => "RunParameters",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    /// File and ClassFile carry `imports`/`exports` edges
    pub fn is_file_like(&self) -> bool {
        matches!(self, EntityKind::File | EntityKind::ClassFile)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Program => "Program",
            EntityKind::Dependency => "Dependency",
            EntityKind::File => "File",
            EntityKind::ClassFile => "ClassFile",
            EntityKind::Class => "Class",
            EntityKind::Function => "Function",
            EntityKind::Dto => "DTO",
            EntityKind::Constants => "Constants",
            EntityKind::Asset => "Asset",
            EntityKind::UIComponent => "UIComponent",
            EntityKind::RunParameter => "RunParameter",
        };
        f.write_str(name)
    }
}

/// Named, directed relationship implied by an entity attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    Entry,
    Exports,
    Imports,
    Calls,
    Input,
    Output,
    Extends,
    Implements,
    Schema,
    Contains,
    ContainedBy,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Entry => "entry",
            Relation::Exports => "exports",
            Relation::Imports => "imports",
            Relation::Calls => "calls",
            Relation::Input => "input",
            Relation::Output => "output",
            Relation::Extends => "extends",
            Relation::Implements => "implements",
            Relation::Schema => "schema",
            Relation::Contains => "contains",
            Relation::ContainedBy => "containedBy",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing edge: the relation and the name it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub relation: Relation,
    pub target: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Name of a File entity
    pub entry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub path: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// Canonical signature text
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub calls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    /// Single declared supertype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

/// A module fused with its primary class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtoField {
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
pub struct Dto {
    #[serde(default)]
    pub fields: Vec<DtoField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Dto {
    pub fn field(&self, name: &str) -> Option<&DtoField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constants {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// An external package the system consumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Names the package supplies that are referenced elsewhere
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiComponent {
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub contained_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParameter {
    pub description: String,
    /// Value type; serialized as `valueType` since `type` carries the kind tag
    #[serde(rename = "valueType", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Kind-specific attributes of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityBody {
    Program(Program),
    Dependency(Dependency),
    File(File),
    ClassFile(ClassFile),
    Class(Class),
    Function(Function),
    #[serde(rename = "DTO")]
    Dto(Dto),
    Constants(Constants),
    Asset(Asset),
    UIComponent(UiComponent),
    RunParameter(RunParameter),
}

/// A named, typed node in the architecture graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub position: Position,
    #[serde(flatten)]
    pub body: EntityBody,
}

impl Entity {
    pub fn new(name: impl Into<String>, position: Position, body: EntityBody) -> Self {
        Self {
            name: name.into(),
            position,
            body,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match &self.body {
            EntityBody::Program(_) => EntityKind::Program,
            EntityBody::Dependency(_) => EntityKind::Dependency,
            EntityBody::File(_) => EntityKind::File,
            EntityBody::ClassFile(_) => EntityKind::ClassFile,
            EntityBody::Class(_) => EntityKind::Class,
            EntityBody::Function(_) => EntityKind::Function,
            EntityBody::Dto(_) => EntityKind::Dto,
            EntityBody::Constants(_) => EntityKind::Constants,
            EntityBody::Asset(_) => EntityKind::Asset,
            EntityBody::UIComponent(_) => EntityKind::UIComponent,
            EntityBody::RunParameter(_) => EntityKind::RunParameter,
        }
    }

    /// `imports` of a File or ClassFile, empty for other kinds
    pub fn imports(&self) -> &[String] {
        match &self.body {
            EntityBody::File(f) => &f.imports,
            EntityBody::ClassFile(cf) => &cf.imports,
            _ => &[],
        }
    }

    /// `exports` of a File or ClassFile, empty for other kinds
    pub fn file_exports(&self) -> &[String] {
        match &self.body {
            EntityBody::File(f) => &f.exports,
            EntityBody::ClassFile(cf) => &cf.exports,
            _ => &[],
        }
    }

    /// Every outgoing edge, in attribute order
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();

        fn list<'a>(out: &mut Vec<Reference<'a>>, relation: Relation, names: &'a [String]) {
            out.extend(names.iter().map(|target| Reference {
                relation,
                target: target.as_str(),
            }));
        }
        fn single<'a>(out: &mut Vec<Reference<'a>>, relation: Relation, name: &'a Option<String>) {
            if let Some(target) = name {
                out.push(Reference {
                    relation,
                    target: target.as_str(),
                });
            }
        }

        match &self.body {
            EntityBody::Program(p) => {
                refs.push(Reference {
                    relation: Relation::Entry,
                    target: p.entry.as_str(),
                });
                list(&mut refs, Relation::Exports, &p.exports);
            }
            EntityBody::File(f) => {
                list(&mut refs, Relation::Imports, &f.imports);
                list(&mut refs, Relation::Exports, &f.exports);
            }
            EntityBody::ClassFile(cf) => {
                single(&mut refs, Relation::Extends, &cf.extends);
                list(&mut refs, Relation::Implements, &cf.implements);
                list(&mut refs, Relation::Imports, &cf.imports);
                list(&mut refs, Relation::Exports, &cf.exports);
            }
            EntityBody::Class(c) => {
                single(&mut refs, Relation::Extends, &c.extends);
                list(&mut refs, Relation::Implements, &c.implements);
            }
            EntityBody::Function(func) => {
                single(&mut refs, Relation::Input, &func.input);
                single(&mut refs, Relation::Output, &func.output);
                list(&mut refs, Relation::Calls, &func.calls);
            }
            EntityBody::Constants(c) => {
                single(&mut refs, Relation::Schema, &c.schema);
            }
            EntityBody::UIComponent(ui) => {
                list(&mut refs, Relation::Contains, &ui.contains);
                list(&mut refs, Relation::ContainedBy, &ui.contained_by);
            }
            EntityBody::Dependency(_)
            | EntityBody::Dto(_)
            | EntityBody::Asset(_)
            | EntityBody::RunParameter(_) => {}
        }

        refs
    }
}
