//! archgraph-model - The architecture entity graph
//!
//! This crate defines the entity kinds that describe a system's static
//! structure, source positions, the flat name-keyed [`EntityGraph`], and the
//! canonical text rendering shared by the design-graph parser and the
//! reconciler output.

mod entity;
mod error;
mod graph;
mod position;
mod render;

pub use entity::*;
pub use error::GraphError;
pub use graph::{EntityGraph, EntityId};
pub use position::{LineIndex, Position, Span};
pub use render::{format_name, render, render_graph, ToDesign, KEYWORDS};
