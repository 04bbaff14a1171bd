//! Per-kind property comparison of two same-named entities

use crate::Deviation;
use archgraph_model::{
    Asset, Class, ClassFile, Constants, Dependency, Dto, Entity, EntityBody, File, Function,
    Program, RunParameter, UiComponent,
};
use archgraph_validator::Severity;
use std::collections::BTreeSet;

/// Rendering of an absent optional attribute
const NONE: &str = "none";

/// Collapse runs of whitespace so formatting differences are not reported
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compares the attributes of one actual entity against its expected twin
pub struct EntityComparer<'a> {
    name: &'a str,
    deviations: Vec<Deviation>,
}

impl<'a> EntityComparer<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            deviations: Vec::new(),
        }
    }

    /// Compare `actual` against `expected`; both must carry the same name
    pub fn compare(mut self, actual: &Entity, expected: &Entity) -> Vec<Deviation> {
        if actual.kind() != expected.kind() {
            self.push(
                Severity::Error,
                "type",
                expected.kind().to_string(),
                actual.kind().to_string(),
            );
            return self.deviations;
        }

        match (&actual.body, &expected.body) {
            (EntityBody::Program(a), EntityBody::Program(e)) => self.program(a, e),
            (EntityBody::Dependency(a), EntityBody::Dependency(e)) => self.dependency(a, e),
            (EntityBody::File(a), EntityBody::File(e)) => self.file(a, e),
            (EntityBody::ClassFile(a), EntityBody::ClassFile(e)) => self.class_file(a, e),
            (EntityBody::Class(a), EntityBody::Class(e)) => self.class(a, e),
            (EntityBody::Function(a), EntityBody::Function(e)) => self.function(a, e),
            (EntityBody::Dto(a), EntityBody::Dto(e)) => self.dto(a, e),
            (EntityBody::Constants(a), EntityBody::Constants(e)) => self.constants(a, e),
            (EntityBody::Asset(a), EntityBody::Asset(e)) => self.asset(a, e),
            (EntityBody::UIComponent(a), EntityBody::UIComponent(e)) => self.ui_component(a, e),
            (EntityBody::RunParameter(a), EntityBody::RunParameter(e)) => {
                self.run_parameter(a, e)
            }
            // Kinds already matched above
            _ => {}
        }
        self.deviations
    }

    fn program(&mut self, actual: &Program, expected: &Program) {
        self.value(Severity::Error, "entry", &expected.entry, &actual.entry);
        self.optional(Severity::Warning, "version", &expected.version, &actual.version);
    }

    fn dependency(&mut self, actual: &Dependency, expected: &Dependency) {
        self.optional(Severity::Warning, "version", &expected.version, &actual.version);
    }

    fn file(&mut self, actual: &File, expected: &File) {
        self.value(Severity::Warning, "path", &expected.path, &actual.path);
        self.members("imports", &expected.imports, &actual.imports);
        self.members("exports", &expected.exports, &actual.exports);
    }

    fn class_file(&mut self, actual: &ClassFile, expected: &ClassFile) {
        self.value(Severity::Warning, "path", &expected.path, &actual.path);
        self.optional(Severity::Warning, "extends", &expected.extends, &actual.extends);
        self.members("implements", &expected.implements, &actual.implements);
        self.members("methods", &expected.methods, &actual.methods);
        self.members("imports", &expected.imports, &actual.imports);
        self.members("exports", &expected.exports, &actual.exports);
    }

    fn class(&mut self, actual: &Class, expected: &Class) {
        self.optional(Severity::Warning, "extends", &expected.extends, &actual.extends);
        self.members("implements", &expected.implements, &actual.implements);
        self.members("methods", &expected.methods, &actual.methods);
    }

    fn function(&mut self, actual: &Function, expected: &Function) {
        let (expected_sig, actual_sig) = (
            normalize_whitespace(&expected.signature),
            normalize_whitespace(&actual.signature),
        );
        self.value(Severity::Error, "signature", &expected_sig, &actual_sig);
        self.optional(Severity::Warning, "input", &expected.input, &actual.input);
        self.optional(Severity::Warning, "output", &expected.output, &actual.output);
        self.members("calls", &expected.calls, &actual.calls);
    }

    fn dto(&mut self, actual: &Dto, expected: &Dto) {
        for field in &expected.fields {
            let property = format!("field.{}", field.name);
            let Some(found) = actual.field(&field.name) else {
                self.push(Severity::Error, property, "field exists", "field missing");
                continue;
            };
            let (expected_type, actual_type) = (
                normalize_whitespace(&field.type_name),
                normalize_whitespace(&found.type_name),
            );
            self.value(
                Severity::Error,
                &format!("{property}.type"),
                &expected_type,
                &actual_type,
            );
            if field.optional != found.optional {
                self.push(
                    Severity::Warning,
                    format!("{property}.optional"),
                    field.optional.to_string(),
                    found.optional.to_string(),
                );
            }
        }

        for field in &actual.fields {
            if expected.field(&field.name).is_none() {
                self.push(
                    Severity::Warning,
                    format!("field.{}", field.name),
                    "field absent",
                    "field exists",
                );
            }
        }
    }

    fn constants(&mut self, actual: &Constants, expected: &Constants) {
        self.value(Severity::Warning, "path", &expected.path, &actual.path);
        self.optional(Severity::Warning, "schema", &expected.schema, &actual.schema);
    }

    fn asset(&mut self, actual: &Asset, expected: &Asset) {
        self.value(Severity::Warning, "path", &expected.path, &actual.path);
    }

    fn ui_component(&mut self, actual: &UiComponent, expected: &UiComponent) {
        self.members("contains", &expected.contains, &actual.contains);
    }

    fn run_parameter(&mut self, actual: &RunParameter, expected: &RunParameter) {
        self.optional(
            Severity::Warning,
            "valueType",
            &expected.type_name,
            &actual.type_name,
        );
        self.optional(Severity::Warning, "default", &expected.default, &actual.default);
    }

    fn value(&mut self, severity: Severity, property: &str, expected: &str, actual: &str) {
        if expected != actual {
            self.push(severity, property, expected, actual);
        }
    }

    fn optional(
        &mut self,
        severity: Severity,
        property: &str,
        expected: &Option<String>,
        actual: &Option<String>,
    ) {
        if expected != actual {
            self.push(
                severity,
                property,
                expected.as_deref().unwrap_or(NONE),
                actual.as_deref().unwrap_or(NONE),
            );
        }
    }

    /// Set comparison: missing members are errors, extra members warnings
    fn members(&mut self, property: &str, expected: &[String], actual: &[String]) {
        let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = actual.iter().map(String::as_str).collect();

        for member in expected.difference(&actual) {
            self.push(Severity::Error, property, *member, "missing");
        }
        for member in actual.difference(&expected) {
            self.push(Severity::Warning, property, "absent", *member);
        }
    }

    fn push(
        &mut self,
        severity: Severity,
        property: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        let deviation = match severity {
            Severity::Error => Deviation::error(self.name, property, expected, actual),
            Severity::Warning => Deviation::warning(self.name, property, expected, actual),
        };
        self.deviations.push(deviation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_model::{DtoField, Position};

    fn function(signature: &str, calls: &[&str]) -> Entity {
        Entity::new(
            "run",
            Position::start(),
            EntityBody::Function(Function {
                signature: signature.into(),
                calls: calls.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }),
        )
    }

    fn field(name: &str, type_name: &str, optional: bool) -> DtoField {
        DtoField {
            name: name.into(),
            type_name: type_name.into(),
            optional,
            description: None,
        }
    }

    fn dto(fields: Vec<DtoField>) -> Entity {
        Entity::new(
            "User",
            Position::start(),
            EntityBody::Dto(Dto {
                fields,
                purpose: None,
            }),
        )
    }

    #[test]
    fn test_signature_whitespace_is_ignored() {
        let deviations = EntityComparer::new("run")
            .compare(&function("(a: string)  =>  void", &[]), &function("(a: string) => void", &[]));
        assert!(deviations.is_empty());
    }

    #[test]
    fn test_signature_mismatch_is_error() {
        let deviations = EntityComparer::new("run")
            .compare(&function("() => number", &[]), &function("() => void", &[]));
        assert_eq!(deviations.len(), 1);
        assert_eq!(deviations[0].property, "signature");
        assert_eq!(deviations[0].expected, "() => void");
        assert_eq!(deviations[0].actual, "() => number");
        assert!(deviations[0].is_error());
    }

    #[test]
    fn test_calls_set_comparison() {
        let deviations = EntityComparer::new("run").compare(
            &function("() => void", &["log", "save", "save"]),
            &function("() => void", &["load", "save"]),
        );
        assert_eq!(
            deviations,
            vec![
                Deviation::error("run", "calls", "load", "missing"),
                Deviation::warning("run", "calls", "absent", "log"),
            ]
        );
    }

    #[test]
    fn test_dto_field_changes() {
        let actual = dto(vec![
            field("id", "number", false),
            field("email", "string", true),
            field("nickname", "string", false),
        ]);
        let expected = dto(vec![
            field("id", "string", false),
            field("email", "string", false),
            field("createdAt", "Date", false),
        ]);
        let deviations = EntityComparer::new("User").compare(&actual, &expected);
        assert_eq!(
            deviations,
            vec![
                Deviation::error("User", "field.id.type", "string", "number"),
                Deviation::warning("User", "field.email.optional", "false", "true"),
                Deviation::error("User", "field.createdAt", "field exists", "field missing"),
                Deviation::warning("User", "field.nickname", "field absent", "field exists"),
            ]
        );
    }

    #[test]
    fn test_kind_mismatch_stops_comparison() {
        let class = Entity::new("run", Position::start(), EntityBody::Class(Class::default()));
        let deviations = EntityComparer::new("run").compare(&class, &function("() => void", &["x"]));
        assert_eq!(
            deviations,
            vec![Deviation::error("run", "type", "Function", "Class")]
        );
    }

    #[test]
    fn test_absent_optional_renders_as_none() {
        let actual = Entity::new(
            "Lodash",
            Position::start(),
            EntityBody::Dependency(Dependency {
                purpose: "Utility functions".into(),
                version: None,
                exports: vec![],
            }),
        );
        let expected = Entity::new(
            "Lodash",
            Position::start(),
            EntityBody::Dependency(Dependency {
                purpose: "Utilities".into(),
                version: Some("4.17.21".into()),
                exports: vec!["debounce".into()],
            }),
        );
        let deviations = EntityComparer::new("Lodash").compare(&actual, &expected);
        assert_eq!(
            deviations,
            vec![Deviation::warning("Lodash", "version", "4.17.21", "none")]
        );
    }
}
