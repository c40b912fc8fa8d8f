//! JSON export of the analysis results.

use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analysis::{CallGraph, CallerSummary, FlatReport, GraphNode};
use crate::domain::ProfileError;
use crate::profiling::BacktraceStats;

/// Graph part of the JSON report.
#[derive(Debug, Serialize)]
pub struct JsonGraph<'a> {
    pub total_backtraces: usize,
    pub nodes: &'a [GraphNode],
    pub top_callers: Vec<CallerSummary>,
}

/// Everything a run produced, in one document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtraces: Option<BacktraceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<JsonGraph<'a>>,
    pub flat: &'a FlatReport,
}

impl<'a> JsonReport<'a> {
    #[must_use]
    pub fn new(
        flat: &'a FlatReport,
        graph: Option<&'a CallGraph>,
        backtraces: Option<BacktraceStats>,
    ) -> Self {
        let graph = graph.map(|g| JsonGraph {
            total_backtraces: g.total_backtraces(),
            nodes: g.nodes(),
            top_callers: g.top_callers(),
        });
        Self { backtraces, graph, flat }
    }

    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn export<W: Write>(&self, writer: &mut W) -> Result<(), ProfileError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Write `report` as pretty-printed JSON to `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_json(report: &JsonReport<'_>, path: &Path) -> Result<(), ProfileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    report.export(&mut writer)?;
    writer.flush()?;
    info!("Wrote JSON report to {}", path.display());
    Ok(())
}
