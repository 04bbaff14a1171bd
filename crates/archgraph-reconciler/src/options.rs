//! Reconciliation options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options controlling one reconciliation run.
///
/// Every field has a default, so a config file only needs the keys it sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcileOptions {
    /// Synthesize one Program entity per entry point.
    pub generate_programs: bool,
    /// Explicit entry module paths. When empty, entry points are detected:
    /// a module named `main`, `index` or `cli` that no other module imports.
    pub entry_points: Vec<String>,
    /// Prefix stripped from module paths when registering import spellings
    /// (e.g. "src").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Import prefix rewrites, e.g. `"@/" -> "src/"`.
    pub path_aliases: BTreeMap<String, String>,
    /// Keep private, `#`-prefixed and constructor methods in `methods`.
    pub include_private_methods: bool,
    /// Version stamped onto synthesized Programs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_version: Option<String>,
    /// Package versions keyed by package name, usually read from a manifest.
    pub dependency_versions: BTreeMap<String, String>,
}

impl ReconcileOptions {
    /// Options that also synthesize Programs.
    pub fn with_programs() -> Self {
        ReconcileOptions {
            generate_programs: true,
            ..Default::default()
        }
    }

    /// Add an explicit entry point.
    pub fn with_entry_point(mut self, path: impl Into<String>) -> Self {
        self.entry_points.push(path.into());
        self
    }

    /// Set the source root.
    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    /// Add an import prefix alias.
    pub fn with_path_alias(mut self, prefix: impl Into<String>, target: impl Into<String>) -> Self {
        self.path_aliases.insert(prefix.into(), target.into());
        self
    }

    /// Overlay `other` onto `self`: set scalars and non-empty collections
    /// in `other` win.
    pub fn merge(mut self, other: ReconcileOptions) -> Self {
        self.generate_programs |= other.generate_programs;
        self.include_private_methods |= other.include_private_methods;
        if !other.entry_points.is_empty() {
            self.entry_points = other.entry_points;
        }
        if other.source_root.is_some() {
            self.source_root = other.source_root;
        }
        if other.program_version.is_some() {
            self.program_version = other.program_version;
        }
        self.path_aliases.extend(other.path_aliases);
        self.dependency_versions.extend(other.dependency_versions);
        self
    }
}
