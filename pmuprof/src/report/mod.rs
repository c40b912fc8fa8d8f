//! Report generation
//!
//! Drives one run from a parsed profile to the printed reports:
//!
//! ```text
//! ParsedProfile
//!     │
//!     ├── backtraces? ──► kernel symbol map ──► CallGraph ──► TOP CALLERS / CALLEES
//!     │                                             └──────► graph.dot (optional)
//!     │
//!     └── samples ──► split kernel/user ──► resolve ──► KERNEL TIME / USER TIME
//!                                                           └──► disassembly (optional)
//! ```
//!
//! Options arrive as an explicit [`ReportConfig`]; nothing is read from
//! process-wide state.

pub mod text;

use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_flat_profile, kernel_symbol_map, CallGraph, FlatReport};
use crate::domain::ProfileError;
use crate::export::{write_dot, write_json, JsonReport};
use crate::profiling::{BacktraceStats, ParsedProfile};
use crate::symbolization::{Disassembler, SymbolSource, SymbolTable};

pub use text::{
    write_backtrace_stats, write_flat_report, write_flat_section, write_graph_report, Annotator,
};

/// Optional behaviour of a report run.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Follow every ranked function with its sample-annotated disassembly.
    pub annotate_disassembly: bool,
    /// Write the call graph as DOT here.
    pub graph_output: Option<PathBuf>,
    /// Write the reports as JSON here.
    pub json_output: Option<PathBuf>,
}

/// The two binaries samples are attributed to.
#[derive(Debug, Clone, Copy)]
pub struct Binaries<'a> {
    pub kernel: &'a Path,
    pub user: &'a Path,
}

/// External tools consulted during a run.
pub struct Collaborators<'a> {
    pub symbols: &'a dyn SymbolSource,
    pub disassembler: &'a dyn Disassembler,
}

/// Results of a run, after everything has been written.
#[derive(Debug)]
pub struct RunReport {
    pub stats: Option<BacktraceStats>,
    pub graph: Option<CallGraph>,
    pub flat: FlatReport,
}

/// Analyse `profile` against both binaries and write all reports to `out`.
///
/// Any unresolvable address, missing symbol or collaborator failure aborts
/// the run; no partial report is returned.
///
/// # Errors
/// Returns the first fatal error of any stage
pub fn generate_report<W: Write>(
    profile: &ParsedProfile,
    binaries: Binaries<'_>,
    tools: &Collaborators<'_>,
    config: &ReportConfig,
    out: &mut W,
) -> Result<RunReport, ProfileError> {
    if let Some(stats) = &profile.stats {
        write_backtrace_stats(out, stats)?;
    }

    let kernel_table = SymbolTable::load(tools.symbols, binaries.kernel)?;

    let graph = if profile.backtraces.is_empty() {
        None
    } else {
        let symbols = kernel_symbol_map(&profile.backtraces, &kernel_table)?;
        let graph = CallGraph::build(&profile.backtraces, &symbols)?;
        if let Some(path) = &config.graph_output {
            write_dot(&graph, path)?;
        }
        write_graph_report(out, &graph)?;
        Some(graph)
    };

    let user_table = SymbolTable::load(tools.symbols, binaries.user)?;
    let flat = analyze_flat_profile(&profile.samples, &kernel_table, &user_table)?;

    if config.annotate_disassembly {
        let kernel = Annotator {
            disassembler: tools.disassembler,
            binary: binaries.kernel,
            table: &kernel_table,
        };
        let user =
            Annotator { disassembler: tools.disassembler, binary: binaries.user, table: &user_table };
        write_flat_report(out, &flat, Some(&kernel), Some(&user))?;
    } else {
        write_flat_report(out, &flat, None, None)?;
    }
    out.flush()?;

    if let Some(path) = &config.json_output {
        write_json(&JsonReport::new(&flat, graph.as_ref(), profile.stats), path)?;
    }

    info!("Report complete: {} samples", flat.total_samples);
    Ok(RunReport { stats: profile.stats, graph, flat })
}
