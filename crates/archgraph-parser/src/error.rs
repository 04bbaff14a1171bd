//! Parser error types

use archgraph_lexer::TokenKind;
use archgraph_model::{LineIndex, Position, Span};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },

    #[error("invalid character")]
    InvalidCharacter { span: Span },

    #[error("expected entity declaration")]
    ExpectedDeclaration { span: Span },

    #[error("unknown attribute '{key}' on {kind} declaration")]
    UnknownAttribute {
        kind: String,
        key: String,
        span: Span,
    },

    #[error("{kind} '{name}' is missing required attribute '{key}'")]
    MissingAttribute {
        kind: String,
        name: String,
        key: String,
        span: Span,
    },

    #[error("Duplicate entity name '{name}'")]
    DuplicateName { name: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::InvalidCharacter { span } => *span,
            ParseError::ExpectedDeclaration { span } => *span,
            ParseError::UnknownAttribute { span, .. } => *span,
            ParseError::MissingAttribute { span, .. } => *span,
            ParseError::DuplicateName { span, .. } => *span,
        }
    }

    /// Line/column of the error within `source`
    pub fn position(&self, source: &str) -> Position {
        LineIndex::new(source).position(self.span().start)
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        match found {
            TokenKind::Eof => ParseError::UnexpectedEof { span },
            TokenKind::Error => ParseError::InvalidCharacter { span },
            _ => ParseError::UnexpectedToken {
                expected: expected.into(),
                found: found.describe().to_string(),
                span,
            },
        }
    }
}
