//! Deviations between an actual and an expected entity

use archgraph_validator::Severity;
use serde::{Deserialize, Serialize};

/// Entity name used for the deviation reported when expected text fails to parse
pub const PARSING_ENTITY: &str = "<parsing>";

/// One reported difference between an actual and expected entity property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    pub entity_name: String,
    pub property: String,
    pub expected: String,
    pub actual: String,
    pub severity: Severity,
}

impl Deviation {
    pub fn error(
        entity_name: impl Into<String>,
        property: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            property: property.into(),
            expected: expected.into(),
            actual: actual.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(
        entity_name: impl Into<String>,
        property: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(entity_name, property, expected, actual)
        }
    }

    /// The single deviation standing in for an unparseable expected document
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::error(PARSING_ENTITY, "syntax", "valid design text", message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the deviation as a single line
    pub fn format_simple(&self) -> String {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        format!(
            "{} {}.{}: expected {}, found {}",
            level, self.entity_name, self.property, self.expected, self.actual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let deviation = Deviation::error("User", "field.email", "field exists", "field missing");
        let json = serde_json::to_value(&deviation).unwrap();
        assert_eq!(json["entityName"], "User");
        assert_eq!(json["property"], "field.email");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn test_format_simple() {
        let deviation = Deviation::warning("src/main", "path", "src/main.ts", "src/app.ts");
        assert_eq!(
            deviation.format_simple(),
            "warning src/main.path: expected src/main.ts, found src/app.ts"
        );
    }
}
