//! archgraph-differ: Graph Differ
//!
//! Compares an actual entity set (typically reconciled from source) against an
//! expected design graph and reports severity-graded deviations, plus the
//! names present on only one side.
//!
//! # Example
//!
//! ```
//! use archgraph_differ::diff_source;
//!
//! let result = diff_source(&[], "# Classes\nclass Widget\n");
//! assert!(!result.success);
//! assert_eq!(result.missing_entities, vec!["Widget"]);
//! ```

mod compare;
mod deviation;

pub use compare::{normalize_whitespace, EntityComparer};
pub use deviation::{Deviation, PARSING_ENTITY};

use archgraph_model::{Entity, EntityGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of one diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// No error deviations and no missing or extra entities
    pub success: bool,
    pub deviations: Vec<Deviation>,
    /// Expected names absent from the actual set, sorted
    pub missing_entities: Vec<String>,
    /// Actual names absent from the expected graph, sorted
    pub extra_entities: Vec<String>,
}

impl DiffResult {
    pub fn errors(&self) -> impl Iterator<Item = &Deviation> {
        self.deviations.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Deviation> {
        self.deviations.iter().filter(|d| !d.is_error())
    }
}

/// Compare `actual` entities against the `expected` graph.
///
/// When `actual` repeats a name, the first occurrence is compared.
pub fn diff(actual: &[Entity], expected: &EntityGraph) -> DiffResult {
    let mut actual_by_name: BTreeMap<&str, &Entity> = BTreeMap::new();
    for entity in actual {
        actual_by_name.entry(entity.name.as_str()).or_insert(entity);
    }
    let expected_by_name: BTreeMap<&str, &Entity> =
        expected.iter().map(|e| (e.name.as_str(), e)).collect();

    let missing_entities: Vec<String> = expected_by_name
        .keys()
        .filter(|name| !actual_by_name.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    let extra_entities: Vec<String> = actual_by_name
        .keys()
        .filter(|name| !expected_by_name.contains_key(*name))
        .map(|name| name.to_string())
        .collect();

    let mut deviations = Vec::new();
    for (name, expected_entity) in &expected_by_name {
        if let Some(actual_entity) = actual_by_name.get(name) {
            deviations.extend(EntityComparer::new(name).compare(actual_entity, expected_entity));
        }
    }

    let success = missing_entities.is_empty()
        && extra_entities.is_empty()
        && !deviations.iter().any(Deviation::is_error);

    debug!(
        deviations = deviations.len(),
        missing = missing_entities.len(),
        extra = extra_entities.len(),
        success,
        "diffed entity graphs"
    );

    DiffResult {
        success,
        deviations,
        missing_entities,
        extra_entities,
    }
}

/// Parse `expected` design text and diff `actual` against it.
///
/// A parse failure yields a single `<parsing>` deviation and no comparison.
pub fn diff_source(actual: &[Entity], expected: &str) -> DiffResult {
    match archgraph_parser::parse(expected) {
        Ok(graph) => diff(actual, &graph),
        Err(err) => {
            debug!(error = %err, "expected design text failed to parse");
            DiffResult {
                success: false,
                deviations: vec![Deviation::syntax(format!(
                    "{} at {}",
                    err,
                    err.position(expected)
                ))],
                missing_entities: Vec::new(),
                extra_entities: Vec::new(),
            }
        }
    }
}
