//! Diagnostics reported over an entity graph

use crate::ValidationIssue;
use archgraph_model::Position;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks success
    Error,
    /// Advisory only
    Warning,
}

/// A positioned message with an optional fix suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub position: Position,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Entity the diagnostic is anchored to; used to order diagnostics
    /// sharing a position
    #[serde(skip)]
    pub anchor: String,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn new(message: impl Into<String>, position: Position, anchor: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position,
            severity: Severity::Error,
            suggestion: None,
            anchor: anchor.into(),
        }
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach a fix suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Canonical ordering: position, then anchor name, then message
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.anchor.cmp(&other.anchor))
            .then_with(|| self.message.cmp(&other.message))
    }

    /// Format the diagnostic as a single line
    pub fn format_simple(&self) -> String {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let mut output = format!("{} [{}]: {}", level, self.position, self.message);
        if let Some(suggestion) = &self.suggestion {
            output.push_str(&format!(" (suggestion: {})", suggestion));
        }
        output
    }
}

impl From<ValidationIssue> for Diagnostic {
    fn from(issue: ValidationIssue) -> Self {
        let mut diagnostic = Diagnostic::new(issue.to_string(), issue.position(), issue.anchor())
            .with_severity(issue.severity());
        if let Some(suggestion) = issue.suggestion() {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        diagnostic
    }
}

/// Sort diagnostics into their canonical order
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.canonical_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_position_then_name() {
        let mut diagnostics = vec![
            Diagnostic::new("late", Position::new(9, 1), "z"),
            Diagnostic::new("b", Position::new(2, 1), "b"),
            Diagnostic::new("a", Position::new(2, 1), "a"),
        ];
        sort_diagnostics(&mut diagnostics);
        let anchors: Vec<_> = diagnostics.iter().map(|d| d.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["a", "b", "z"]);
    }

    #[test]
    fn test_serialized_shape() {
        let diagnostic = Diagnostic::new("Orphaned entity: A", Position::new(1, 1), "A")
            .with_suggestion("Remove or reference this entity");
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["position"]["line"], 1);
        assert_eq!(json["suggestion"], "Remove or reference this entity");
        assert!(json.get("anchor").is_none());

        let cycle = Diagnostic::new("Circular import detected: A -> B -> A", Position::new(1, 1), "A");
        let json = serde_json::to_value(&cycle).unwrap();
        assert!(json.get("suggestion").is_none());
    }
}
