//! archgraph-parser - Recursive descent parser for design-graph text
//!
//! Parses the canonical rendering produced by `archgraph_model::render` (and
//! hand-authored text in the same format) into entities.

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use archgraph_lexer::tokenize;
use archgraph_model::EntityGraph;
use tracing::debug;

/// Parse design text into its declarations, in source order.
/// Duplicate names are kept; callers decide how to report them.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let declarations = parser.parse_document()?;
    debug!(count = declarations.len(), "parsed design declarations");
    Ok(declarations)
}

/// Parse design text into an entity graph.
/// The first duplicate name is reported as an error.
pub fn parse(source: &str) -> Result<EntityGraph, ParseError> {
    let mut graph = EntityGraph::new();
    for decl in parse_declarations(source)? {
        let span = decl.span;
        graph
            .insert(decl.entity)
            .map_err(|e| ParseError::DuplicateName {
                name: e.name().to_string(),
                span,
            })?;
    }
    Ok(graph)
}
