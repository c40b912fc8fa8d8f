//! Graphviz export of the call graph.
//!
//! Node height and width grow linearly from [`MIN_NODE_SIZE`] to
//! [`MAX_NODE_SIZE`] with `fraction / max_fraction`. All edges get the same
//! pen width; call counts are not drawn.

use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analysis::CallGraph;
use crate::domain::ProfileError;

pub const MIN_NODE_SIZE: f64 = 1.0;
pub const MAX_NODE_SIZE: f64 = 4.0;

/// Renders a [`CallGraph`] as a `digraph`.
pub struct DotExporter<'a> {
    graph: &'a CallGraph,
}

impl<'a> DotExporter<'a> {
    #[must_use]
    pub fn new(graph: &'a CallGraph) -> Self {
        Self { graph }
    }

    /// Size hint for a node with the given fraction.
    #[must_use]
    pub fn node_size(&self, fraction: f64) -> f64 {
        let max = self.graph.max_fraction();
        if max <= 0.0 {
            return MIN_NODE_SIZE;
        }
        MIN_NODE_SIZE + (MAX_NODE_SIZE - MIN_NODE_SIZE) * (fraction / max)
    }

    /// # Errors
    /// Returns an error if writing fails
    pub fn export<W: Write>(&self, writer: &mut W) -> Result<(), ProfileError> {
        writeln!(writer, "digraph {{")?;
        for node in self.graph.nodes() {
            let size = self.node_size(node.fraction);
            writeln!(
                writer,
                "\t\"{}\" [height={size:.2}, width={size:.2}, label=\"\\N\\n{:.2}%\"]",
                escape(&node.name),
                node.fraction * 100.0
            )?;
        }
        for (caller, callee, _) in self.graph.edges() {
            writeln!(
                writer,
                "\t\"{}\" -> \"{}\" [penwidth=1]",
                escape(&caller.name),
                escape(&callee.name)
            )?;
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write the DOT description of `graph` to `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_dot(graph: &CallGraph, path: &Path) -> Result<(), ProfileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    DotExporter::new(graph).export(&mut writer)?;
    writer.flush()?;
    info!("Wrote call graph to {}", path.display());
    Ok(())
}
