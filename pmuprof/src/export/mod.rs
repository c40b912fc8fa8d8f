//! Report export
//!
//! Writes analysis results to files for other tools:
//! - Graphviz DOT description of the call graph (node size encodes time share)
//! - JSON dump of the flat and graph reports

pub mod dot;
pub mod json;

pub use dot::{write_dot, DotExporter};
pub use json::{write_json, JsonReport};
