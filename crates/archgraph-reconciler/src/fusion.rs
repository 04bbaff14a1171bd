//! Class/file fusion
//!
//! A module whose primary class is fused with it materializes as a single
//! ClassFile named after the class. Entry modules are never fused so that a
//! Program's `entry` always names a File.

use crate::descriptor::{DeclKind, ModuleDescriptor};
use crate::paths::{file_stem, loose_eq, strip_extension};
use crate::ReconcileError;
use std::collections::HashSet;

/// How one module materializes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionStrategy {
    /// File and class fused into a ClassFile; index into `classes`
    Fused { class: usize },
    /// A File plus sibling entities
    Standalone,
}

/// Pass 2 decision for one module
#[derive(Debug, Clone)]
pub struct ModulePlan {
    pub strategy: FusionStrategy,
    /// Name of the File or ClassFile entity for the module
    pub file_entity: String,
    materialized: HashSet<String>,
}

impl ModulePlan {
    pub fn fused_class(&self) -> Option<usize> {
        match self.strategy {
            FusionStrategy::Fused { class } => Some(class),
            FusionStrategy::Standalone => None,
        }
    }

    /// Whether the declaration `name` becomes an entity
    pub fn materializes(&self, name: &str) -> bool {
        self.materialized.contains(name)
    }

    /// Whether a declaration of this kind becomes an entity
    pub fn keeps(&self, kind: DeclKind, exported: bool) -> bool {
        match kind {
            DeclKind::Function => exported || self.fused_class().is_none(),
            DeclKind::Constant => exported,
            DeclKind::Class | DeclKind::Interface | DeclKind::TypeAlias => true,
        }
    }
}

/// The class a module is organized around, if any
pub fn primary_class(module: &ModuleDescriptor, path: &str) -> Result<Option<usize>, ReconcileError> {
    let classes = &module.classes;
    let default_export = module
        .exports
        .iter()
        .find(|e| e.is_default && e.source.is_none())
        .map(|e| e.name.as_str());

    if let Some(idx) = classes
        .iter()
        .position(|c| c.is_default || Some(c.name.as_str()) == default_export)
    {
        return Ok(Some(idx));
    }

    let stem = file_stem(path);
    if let Some(idx) = classes.iter().position(|c| loose_eq(&c.name, stem)) {
        return Ok(Some(idx));
    }

    match classes.len() {
        0 => Ok(None),
        1 => Ok(Some(0)),
        _ => Err(ReconcileError::MissingPrimaryClass {
            file: path.to_string(),
            classes: classes.iter().map(|c| c.name.clone()).collect(),
        }),
    }
}

/// Choose how a module materializes.
///
/// Problems are returned alongside the plan; the plan is always usable.
pub fn plan_module(
    module: &ModuleDescriptor,
    path: &str,
    is_entry: bool,
) -> (ModulePlan, Vec<ReconcileError>) {
    let mut errors = Vec::new();

    let primary = match primary_class(module, path) {
        Ok(primary) => primary,
        Err(warning) => {
            errors.push(warning);
            None
        }
    };

    let mut strategy = FusionStrategy::Standalone;
    if let (Some(class), false) = (primary, is_entry) {
        let name = module.classes[class].name.as_str();
        let clash = module
            .declarations()
            .filter(|(other, _, _)| *other == name)
            .find(|(_, kind, _)| *kind != DeclKind::Class)
            .map(|(_, kind, _)| kind)
            .or_else(|| {
                let classes = module.classes.iter().filter(|c| c.name == name).count();
                (classes > 1).then_some(DeclKind::Class)
            });
        match clash {
            Some(kind) => errors.push(ReconcileError::UnfusableClass {
                class: name.to_string(),
                file: path.to_string(),
                other: describe(kind).to_string(),
            }),
            None => strategy = FusionStrategy::Fused { class },
        }
    }

    let file_entity = match strategy {
        FusionStrategy::Fused { class } => module.classes[class].name.clone(),
        FusionStrategy::Standalone => strip_extension(path).to_string(),
    };

    let mut plan = ModulePlan {
        strategy,
        file_entity,
        materialized: HashSet::new(),
    };
    let kept: Vec<String> = module
        .declarations()
        .filter(|(_, kind, exported)| plan.keeps(*kind, *exported))
        .map(|(name, _, _)| name.to_string())
        .collect();
    plan.materialized.extend(kept);
    (plan, errors)
}

fn describe(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Function => "function",
        DeclKind::Class => "class",
        DeclKind::Interface => "interface",
        DeclKind::TypeAlias => "type alias",
        DeclKind::Constant => "constant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassDescriptor, ExportDescriptor, FunctionDescriptor, InterfaceDescriptor};

    fn class(name: &str) -> ClassDescriptor {
        ClassDescriptor {
            name: name.into(),
            exported: true,
            ..Default::default()
        }
    }

    fn function(name: &str, exported: bool) -> FunctionDescriptor {
        FunctionDescriptor {
            name: name.into(),
            exported,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_class_is_fused() {
        let mut module = ModuleDescriptor::new("src/user-service.ts");
        module.classes.push(class("UserService"));
        module.functions.push(function("createService", true));
        module.functions.push(function("helper", false));

        let (plan, errors) = plan_module(&module, "src/user-service.ts", false);
        assert!(errors.is_empty());
        assert_eq!(plan.fused_class(), Some(0));
        assert_eq!(plan.file_entity, "UserService");
        assert!(plan.materializes("createService"));
        assert!(!plan.materializes("helper"));
    }

    #[test]
    fn test_entry_module_is_never_fused() {
        let mut module = ModuleDescriptor::new("src/main.ts");
        module.classes.push(class("App"));
        module.functions.push(function("helper", false));

        let (plan, _) = plan_module(&module, "src/main.ts", true);
        assert_eq!(plan.strategy, FusionStrategy::Standalone);
        assert_eq!(plan.file_entity, "src/main");
        assert!(plan.materializes("App"));
        assert!(plan.materializes("helper"));
    }

    #[test]
    fn test_default_export_wins_over_stem() {
        let mut module = ModuleDescriptor::new("src/shapes.ts");
        module.classes.push(class("Shapes"));
        module.classes.push(class("Circle"));
        module.exports.push(ExportDescriptor {
            name: "Circle".into(),
            is_default: true,
            kind: "class".into(),
            source: None,
        });
        assert_eq!(primary_class(&module, "src/shapes.ts"), Ok(Some(1)));
    }

    #[test]
    fn test_several_classes_without_primary() {
        let mut module = ModuleDescriptor::new("src/shapes.ts");
        module.classes.push(class("Circle"));
        module.classes.push(class("Square"));

        let (plan, errors) = plan_module(&module, "src/shapes.ts", false);
        assert_eq!(plan.strategy, FusionStrategy::Standalone);
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].is_hard_error());
        assert!(matches!(errors[0], ReconcileError::MissingPrimaryClass { .. }));
    }

    #[test]
    fn test_name_clash_is_unfusable() {
        let mut module = ModuleDescriptor::new("src/user.ts");
        module.classes.push(class("User"));
        module.interfaces.push(InterfaceDescriptor {
            name: "User".into(),
            ..Default::default()
        });

        let (plan, errors) = plan_module(&module, "src/user.ts", false);
        assert_eq!(plan.strategy, FusionStrategy::Standalone);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_hard_error());
        assert!(errors[0].to_string().contains("interface"));
    }
}
