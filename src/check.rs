//! Consistency check of hand-written design text

use archgraph_model::EntityGraph;
use archgraph_parser::parse_declarations;
use archgraph_validator::{
    check_references, sort_diagnostics, validate, Diagnostic, ValidationIssue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of checking one design document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// No error-severity diagnostic was produced
    pub valid: bool,
    /// Errors and warnings, sorted by position then entity name
    pub errors: Vec<Diagnostic>,
}

impl CheckReport {
    fn from_diagnostics(mut errors: Vec<Diagnostic>) -> Self {
        sort_diagnostics(&mut errors);
        Self {
            valid: !errors.iter().any(Diagnostic::is_error),
            errors,
        }
    }
}

/// Parse design text and run every structural check over it.
///
/// A syntax error stops the check with a single diagnostic. Otherwise all
/// findings are collected: duplicate names, circular imports, orphans,
/// non-File program entries and unresolved names.
pub fn check(text: &str) -> CheckReport {
    let declarations = match parse_declarations(text) {
        Ok(declarations) => declarations,
        Err(err) => {
            debug!(error = %err, "design text failed to parse");
            return CheckReport::from_diagnostics(vec![Diagnostic::new(
                err.to_string(),
                err.position(text),
                "",
            )]);
        }
    };

    let (graph, duplicates) =
        EntityGraph::from_entities(declarations.into_iter().map(|d| d.entity));

    let mut diagnostics: Vec<Diagnostic> = duplicates
        .iter()
        .map(|dup| {
            Diagnostic::from(ValidationIssue::DuplicateName {
                name: dup.name().to_string(),
                position: dup.position(),
            })
        })
        .collect();
    diagnostics.extend(validate(&graph));
    diagnostics.extend(check_references(&graph));

    let report = CheckReport::from_diagnostics(diagnostics);
    debug!(
        entities = graph.len(),
        diagnostics = report.errors.len(),
        valid = report.valid,
        "checked design text"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_model::Position;
    use archgraph_validator::Severity;

    const VALID: &str = r#"
# Programs
program App entry="src/main"

# Files
file "src/main" path="src/main.ts"
  imports: ["src/util"]

file "src/util" path="src/util.ts"
"#;

    #[test]
    fn test_valid_document() {
        let report = check(VALID);
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_syntax_error_is_single_diagnostic() {
        let report = check("file Main");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].position, Position::new(1, 1));
    }

    #[test]
    fn test_duplicates_are_all_reported() {
        let source = "class A\nclass A\nclass A\n";
        let report = check(source);
        assert!(!report.valid);
        let duplicates: Vec<_> = report
            .errors
            .iter()
            .filter(|d| d.message.contains("Duplicate entity name"))
            .collect();
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].position, Position::new(2, 1));
        assert_eq!(duplicates[1].position, Position::new(3, 1));
    }

    #[test]
    fn test_unresolved_name_is_warning_only() {
        let source = r#"
program App entry="src/main"
file "src/main" path="src/main.ts"
  imports: [Lodash]
"#;
        let report = check(source);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_findings_are_sorted_by_position() {
        let source = r#"
file a path="a.ts"
  imports: [b]
file b path="b.ts"
  imports: [a]
class Lonely
"#;
        let report = check(source);
        assert!(!report.valid);
        let positions: Vec<_> = report.errors.iter().map(|d| d.position).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(report
            .errors
            .iter()
            .any(|d| d.message.starts_with("Circular import detected")));
        assert!(report
            .errors
            .iter()
            .any(|d| d.message.contains("Lonely")));
    }
}
