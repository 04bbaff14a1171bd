//! End-to-end tests for the reconcile pipeline
//!
//! Descriptors go through both reconciliation passes, and the resulting
//! entities are rendered, re-parsed and validated.

mod common;

use archgraph::model::{render, EntityBody, EntityGraph, EntityKind};
use archgraph::reconciler::{resolve, ReconcileError, ReconcileOptions};
use archgraph::validator::validate;
use common::{assert_kind, entity, names, sample_options, sample_project, ModuleBuilder};

#[test]
fn e2e_sample_project_entities() {
    let result = resolve(&sample_project(), &sample_options());
    assert!(result.success, "{:?}", result.diagnostics);
    assert!(result.diagnostics.is_empty());

    assert_eq!(
        names(&result.entities),
        vec![
            "MainProgram",
            "src/main",
            "bootstrap",
            "UserService",
            "findUser",
            "User",
            "Lodash",
        ]
    );
    assert_kind(&result.entities, "MainProgram", EntityKind::Program);
    assert_kind(&result.entities, "src/main", EntityKind::File);
    assert_kind(&result.entities, "UserService", EntityKind::ClassFile);
    assert_kind(&result.entities, "User", EntityKind::Dto);
    assert_kind(&result.entities, "Lodash", EntityKind::Dependency);
}

#[test]
fn e2e_sample_project_relationships() {
    let result = resolve(&sample_project(), &sample_options());

    match &entity(&result.entities, "MainProgram").body {
        EntityBody::Program(program) => {
            assert_eq!(program.entry, "src/main");
            assert_eq!(program.version.as_deref(), Some("1.0.0"));
            assert_eq!(program.exports, vec!["bootstrap"]);
        }
        other => panic!("Expected program, got {other:?}"),
    }

    match &entity(&result.entities, "src/main").body {
        EntityBody::File(file) => {
            assert_eq!(file.path, "src/main.ts");
            assert_eq!(file.imports, vec!["UserService", "Lodash"]);
            assert_eq!(file.exports, vec!["bootstrap"]);
        }
        other => panic!("Expected file, got {other:?}"),
    }

    match &entity(&result.entities, "bootstrap").body {
        EntityBody::Function(function) => {
            assert_eq!(function.signature, "() => void");
            // External names are not callable entities
            assert_eq!(function.calls, vec!["UserService"]);
        }
        other => panic!("Expected function, got {other:?}"),
    }

    match &entity(&result.entities, "UserService").body {
        EntityBody::ClassFile(class_file) => {
            assert_eq!(class_file.path, "src/services/user-service.ts");
            assert_eq!(class_file.methods, vec!["getUser", "saveUser"]);
            assert_eq!(class_file.exports, vec!["UserService", "User", "findUser"]);
            assert!(class_file.imports.is_empty());
        }
        other => panic!("Expected class file, got {other:?}"),
    }

    match &entity(&result.entities, "findUser").body {
        EntityBody::Function(function) => {
            assert_eq!(function.signature, "(id: string) => Promise<User>");
            assert_eq!(function.input, None);
            assert_eq!(function.output.as_deref(), Some("User"));
        }
        other => panic!("Expected function, got {other:?}"),
    }

    match &entity(&result.entities, "Lodash").body {
        EntityBody::Dependency(dependency) => {
            assert_eq!(dependency.version.as_deref(), Some("4.17.21"));
            assert_eq!(dependency.exports, vec!["debounce"]);
        }
        other => panic!("Expected dependency, got {other:?}"),
    }
}

#[test]
fn e2e_reconciled_graph_checks_clean() {
    let result = resolve(&sample_project(), &sample_options());
    let report = archgraph::check(&render(&result.entities));
    assert!(report.valid, "{:?}", report.errors);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

#[test]
fn e2e_input_order_is_irrelevant() {
    let mut reversed = sample_project();
    reversed.reverse();
    let forward = resolve(&sample_project(), &sample_options());
    let backward = resolve(&reversed, &sample_options());
    assert_eq!(forward.entities, backward.entities);
}

#[test]
fn e2e_forward_references_resolve() {
    // `a` is processed before `b` declares what it imports
    let modules = vec![
        ModuleBuilder::new("src/a.ts")
            .import("./b", &["helper"])
            .function("useHelper", &["helper"])
            .build(),
        ModuleBuilder::new("src/b.ts").function("helper", &[]).build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::default());
    assert!(result.success);
    match &entity(&result.entities, "useHelper").body {
        EntityBody::Function(function) => assert_eq!(function.calls, vec!["helper"]),
        other => panic!("Expected function, got {other:?}"),
    }
}

#[test]
fn e2e_circular_imports_are_detected() {
    let modules = vec![
        ModuleBuilder::new("src/a.ts")
            .import("./b", &["fromB"])
            .function("fromA", &["fromB"])
            .build(),
        ModuleBuilder::new("src/b.ts")
            .import("./a", &["fromA"])
            .function("fromB", &["fromA"])
            .build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::default());
    assert!(result.success);

    let (graph, duplicates) = EntityGraph::from_entities(result.entities);
    assert!(duplicates.is_empty());
    let cycles: Vec<_> = validate(&graph)
        .into_iter()
        .filter(|d| d.message.starts_with("Circular import detected"))
        .collect();
    assert_eq!(cycles.len(), 1, "{cycles:?}");
    assert!(cycles[0].message.contains("src/a"));
    assert!(cycles[0].message.contains("src/b"));
}

#[test]
fn e2e_namespace_import_references_file() {
    let modules = vec![
        ModuleBuilder::new("src/cli.ts")
            .namespace_import("./format", "fmt")
            .function("run", &["fmt.formatUser"])
            .build(),
        ModuleBuilder::new("src/format.ts")
            .function("formatUser", &[])
            .build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::with_programs());
    assert!(result.success, "{:?}", result.diagnostics);

    match &entity(&result.entities, "src/cli").body {
        EntityBody::File(file) => assert_eq!(file.imports, vec!["src/format"]),
        other => panic!("Expected file, got {other:?}"),
    }
    match &entity(&result.entities, "run").body {
        EntityBody::Function(function) => assert_eq!(function.calls, vec!["formatUser"]),
        other => panic!("Expected function, got {other:?}"),
    }
    assert_kind(&result.entities, "CliProgram", EntityKind::Program);
}

#[test]
fn e2e_re_exports_pass_through_barrels() {
    let modules = vec![
        ModuleBuilder::new("src/lib/index.ts")
            .re_export("slugify", "./strings")
            .build(),
        ModuleBuilder::new("src/lib/strings.ts")
            .function("slugify", &[])
            .build(),
        ModuleBuilder::new("src/page.ts")
            .import("./lib", &["slugify"])
            .function("render", &["slugify"])
            .build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::default());
    assert!(result.success, "{:?}", result.diagnostics);
    match &entity(&result.entities, "src/page").body {
        EntityBody::File(file) => assert_eq!(file.imports, vec!["slugify"]),
        other => panic!("Expected file, got {other:?}"),
    }
}

#[test]
fn e2e_duplicate_names_across_modules_fail() {
    let modules = vec![
        ModuleBuilder::new("src/a.ts").function("format", &[]).build(),
        ModuleBuilder::new("src/b.ts").function("format", &[]).build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::default());
    assert!(!result.success);
    assert!(result.entities.is_empty());
    assert!(matches!(
        result.errors().next(),
        Some(ReconcileError::DuplicateEntityName { name, .. }) if name == "format"
    ));
}

#[test]
fn e2e_missing_entry_point_warns() {
    let options = ReconcileOptions::with_programs().with_entry_point("src/server.ts");
    let result = resolve(&sample_project(), &options);
    assert!(result.success);
    assert!(result
        .warnings()
        .any(|w| matches!(w, ReconcileError::EntryPointNotFound { entry } if entry == "src/server.ts")));
    assert!(result
        .entities
        .iter()
        .all(|e| e.kind() != EntityKind::Program));
}

#[test]
fn e2e_package_shadowing_local_stem_stays_external() {
    let modules = vec![
        ModuleBuilder::new("src/config.ts").function("loadConfig", &[]).build(),
        ModuleBuilder::new("src/main.ts")
            .import("config", &["get"])
            .import("./config", &["loadConfig"])
            .function("start", &["get", "loadConfig"])
            .build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::with_programs());
    assert!(result.success, "{:?}", result.diagnostics);

    assert_kind(&result.entities, "Config", EntityKind::Dependency);
    match &entity(&result.entities, "start").body {
        EntityBody::Function(function) => assert_eq!(function.calls, vec!["Config", "loadConfig"]),
        other => panic!("Expected function, got {other:?}"),
    }
}

#[test]
fn e2e_several_entry_points_each_get_a_program() {
    let modules = vec![
        ModuleBuilder::new("scripts/index.ts").function("migrate", &[]).build(),
        ModuleBuilder::new("src/index.ts").function("serve", &[]).build(),
        ModuleBuilder::new("src/cli.ts")
            .import("./index", &["serve"])
            .function("run", &["serve"])
            .build(),
    ];
    let result = resolve(&modules, &ReconcileOptions::with_programs());
    assert!(result.success, "{:?}", result.diagnostics);

    // src/index is imported by src/cli, so only two modules are entries
    let programs: Vec<_> = result
        .entities
        .iter()
        .filter(|e| e.kind() == EntityKind::Program)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(programs, vec!["IndexProgram", "CliProgram"]);
    match &entity(&result.entities, "IndexProgram").body {
        EntityBody::Program(program) => assert_eq!(program.entry, "scripts/index"),
        other => panic!("Expected program, got {other:?}"),
    }
}
