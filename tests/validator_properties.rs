//! Structural properties of validation and reconciliation

mod common;

use archgraph::check;
use archgraph::model::{EntityBody, EntityKind};
use archgraph::parser::parse;
use archgraph::reconciler::{resolve, ReconcileOptions};
use archgraph::validator::validate;
use common::{names, sample_options, sample_project, ModuleBuilder};

const MUTUAL_IMPORTS: &str = r#"
# Files
file A path="a.ts"
  imports: [B]

file B path="b.ts"
  imports: [A]
"#;

#[test]
fn isolated_import_cycle_yields_three_errors() {
    let report = check(MUTUAL_IMPORTS);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 3, "{:?}", report.errors);
    assert!(report.errors.iter().all(|d| d.is_error()));

    let cycles: Vec<_> = report
        .errors
        .iter()
        .filter(|d| d.message.starts_with("Circular import detected"))
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].message.contains("A -> B -> A"));

    let orphans: Vec<_> = report
        .errors
        .iter()
        .filter(|d| d.message.starts_with("Orphaned entity"))
        .collect();
    assert_eq!(orphans.len(), 2);
}

#[test]
fn validation_is_deterministic() {
    let graph = parse(MUTUAL_IMPORTS).unwrap();
    let first = validate(&graph);
    for _ in 0..5 {
        assert_eq!(validate(&graph), first);
    }
}

#[test]
fn program_entry_must_be_a_file() {
    let source = r#"
program App entry=Service
class Service
"#;
    let report = check(source);
    assert!(!report.valid);
    assert!(report
        .errors
        .iter()
        .any(|d| d.is_error() && d.message.contains("Service")));
}

#[test]
fn resolving_twice_is_idempotent() {
    let first = resolve(&sample_project(), &sample_options());
    let second = resolve(&sample_project(), &sample_options());
    assert_eq!(names(&first.entities), names(&second.entities));
    assert_eq!(first.entities, second.entities);
}

#[test]
fn single_class_module_fuses_into_one_class_file() {
    let module = ModuleBuilder::new("src/order-repository.ts")
        .class("OrderRepository", &["constructor", "find", "save"])
        .function("createRepository", &["OrderRepository"])
        .build();
    let result = resolve(&[module], &ReconcileOptions::default());
    assert!(result.success, "{:?}", result.diagnostics);

    let kinds: Vec<_> = result.entities.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EntityKind::ClassFile, EntityKind::Function]);
    assert!(result.entities.iter().all(|e| e.kind() != EntityKind::File));
    assert!(result.entities.iter().all(|e| e.kind() != EntityKind::Class));

    match &result.entities[0].body {
        EntityBody::ClassFile(class_file) => {
            assert_eq!(result.entities[0].name, "OrderRepository");
            assert_eq!(class_file.methods, vec!["find", "save"]);
        }
        other => panic!("Expected class file, got {other:?}"),
    }
}
