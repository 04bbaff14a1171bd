//! Canonical text printer for entity graphs
//!
//! Renders entities grouped by kind under fixed-order section headers. Each
//! entity is a declaration line followed by indented relationship lines, two
//! spaces per level. The output is accepted by `archgraph-parser`.

use crate::{
    Asset, Class, ClassFile, Constants, Dependency, Dto, Entity, EntityBody, EntityGraph,
    EntityKind, File, Function, Program, RunParameter, UiComponent,
};

/// Words that cannot appear as bare names
pub const KEYWORDS: &[&str] = &[
    "program",
    "dependency",
    "file",
    "classfile",
    "class",
    "function",
    "dto",
    "constants",
    "asset",
    "uicomponent",
    "runparameter",
    "field",
];

/// Trait for converting entities to canonical design text.
pub trait ToDesign {
    /// Convert to canonical design text with the given indentation level.
    fn to_design(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (two spaces per level).
fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Escape a string for output (double quotes, newlines, etc.)
fn escape_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

fn is_bare_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$');
    first_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '-'))
        && !KEYWORDS.contains(&name)
}

/// Render a name bare when it lexes as an identifier, quoted otherwise
pub fn format_name(name: &str) -> String {
    if is_bare_name(name) {
        name.to_string()
    } else {
        quoted(name)
    }
}

/// Accumulates one declaration: the head line and its relationship lines
struct DeclWriter {
    indent: usize,
    head: String,
    lines: Vec<String>,
}

impl DeclWriter {
    fn new(indent: usize, kind: EntityKind, name: &str) -> Self {
        Self {
            indent,
            head: format!("{}{} {}", indent_str(indent), kind.keyword(), format_name(name)),
            lines: Vec::new(),
        }
    }

    fn text(&mut self, key: &str, value: &str) -> &mut Self {
        self.head.push_str(&format!(" {}={}", key, quoted(value)));
        self
    }

    fn opt_text(&mut self, key: &str, value: &Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.text(key, v);
        }
        self
    }

    fn name_ref(&mut self, key: &str, value: &Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.head.push_str(&format!(" {}={}", key, format_name(v)));
        }
        self
    }

    fn flag(&mut self, key: &str, on: bool) -> &mut Self {
        if on {
            self.head.push(' ');
            self.head.push_str(key);
        }
        self
    }

    fn list(&mut self, key: &str, names: &[String]) -> &mut Self {
        if !names.is_empty() {
            let items: Vec<String> = names.iter().map(|n| format_name(n)).collect();
            self.lines.push(format!(
                "{}{}: [{}]",
                indent_str(self.indent + 1),
                key,
                items.join(", ")
            ));
        }
        self
    }

    fn line(&mut self, line: String) -> &mut Self {
        self.lines.push(format!("{}{}", indent_str(self.indent + 1), line));
        self
    }

    fn finish(&mut self) -> String {
        let mut out = std::mem::take(&mut self.head);
        out.push('\n');
        for line in self.lines.drain(..) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn write_program(w: &mut DeclWriter, p: &Program) {
    w.name_ref("entry", &Some(p.entry.clone()))
        .opt_text("version", &p.version)
        .list("exports", &p.exports);
}

fn write_dependency(w: &mut DeclWriter, d: &Dependency) {
    w.text("purpose", &d.purpose)
        .opt_text("version", &d.version)
        .list("exports", &d.exports);
}

fn write_file(w: &mut DeclWriter, f: &File) {
    w.text("path", &f.path)
        .list("imports", &f.imports)
        .list("exports", &f.exports);
}

fn write_class_file(w: &mut DeclWriter, cf: &ClassFile) {
    w.text("path", &cf.path)
        .name_ref("extends", &cf.extends)
        .list("implements", &cf.implements)
        .list("imports", &cf.imports)
        .list("methods", &cf.methods)
        .list("exports", &cf.exports);
}

fn write_class(w: &mut DeclWriter, c: &Class) {
    w.name_ref("extends", &c.extends)
        .list("implements", &c.implements)
        .list("methods", &c.methods);
}

fn write_function(w: &mut DeclWriter, f: &Function) {
    w.text("signature", &f.signature)
        .name_ref("input", &f.input)
        .name_ref("output", &f.output)
        .opt_text("description", &f.description)
        .list("calls", &f.calls);
}

fn write_dto(w: &mut DeclWriter, d: &Dto) {
    w.opt_text("purpose", &d.purpose);
    for field in &d.fields {
        let mut line = format!(
            "field {}{}: {}",
            format_name(&field.name),
            if field.optional { "?" } else { "" },
            quoted(&field.type_name)
        );
        if let Some(desc) = &field.description {
            line.push_str(&format!(" description={}", quoted(desc)));
        }
        w.line(line);
    }
}

fn write_constants(w: &mut DeclWriter, c: &Constants) {
    w.text("path", &c.path).name_ref("schema", &c.schema);
}

fn write_asset(w: &mut DeclWriter, a: &Asset) {
    w.text("path", &a.path).opt_text("description", &a.description);
}

fn write_ui_component(w: &mut DeclWriter, ui: &UiComponent) {
    w.flag("root", ui.root)
        .opt_text("description", &ui.description)
        .list("contains", &ui.contains)
        .list("containedBy", &ui.contained_by);
}

fn write_run_parameter(w: &mut DeclWriter, rp: &RunParameter) {
    w.text("description", &rp.description)
        .opt_text("type", &rp.type_name)
        .opt_text("default", &rp.default);
}

impl ToDesign for Entity {
    fn to_design(&self, indent: usize) -> String {
        let mut w = DeclWriter::new(indent, self.kind(), &self.name);
        match &self.body {
            EntityBody::Program(p) => write_program(&mut w, p),
            EntityBody::Dependency(d) => write_dependency(&mut w, d),
            EntityBody::File(f) => write_file(&mut w, f),
            EntityBody::ClassFile(cf) => write_class_file(&mut w, cf),
            EntityBody::Class(c) => write_class(&mut w, c),
            EntityBody::Function(f) => write_function(&mut w, f),
            EntityBody::Dto(d) => write_dto(&mut w, d),
            EntityBody::Constants(c) => write_constants(&mut w, c),
            EntityBody::Asset(a) => write_asset(&mut w, a),
            EntityBody::UIComponent(ui) => write_ui_component(&mut w, ui),
            EntityBody::RunParameter(rp) => write_run_parameter(&mut w, rp),
        }
        w.finish()
    }
}

/// Render entities grouped by kind under fixed-order section headers.
/// Empty sections are omitted; within a section input order is kept.
pub fn render(entities: &[Entity]) -> String {
    let mut sections = Vec::new();
    for kind in EntityKind::ALL {
        let body: String = entities
            .iter()
            .filter(|e| e.kind() == kind)
            .map(|e| e.to_design(0))
            .collect();
        if !body.is_empty() {
            sections.push(format!("# {}\n{}", kind.section_title(), body));
        }
    }
    sections.join("\n")
}

pub fn render_graph(graph: &EntityGraph) -> String {
    render(graph.entities())
}
