//! Plain-text report rendering.
//!
//! Column layout is fixed so successive runs diff cleanly:
//!
//! ```text
//! ==== KERNEL TIME ====
//! <name, 35 wide>                     <frac> (<count>) (<cumulative>)
//! ---------
//! total   0.93
//! ```

use std::io::Write;
use std::path::Path;

use crate::analysis::{CallGraph, FlatReport, FlatSection};
use crate::domain::ProfileError;
use crate::profiling::BacktraceStats;
use crate::symbolization::{Disassembler, SymbolTable};

/// Source of per-instruction listings for one section's binary.
pub struct Annotator<'a> {
    pub disassembler: &'a dyn Disassembler,
    pub binary: &'a Path,
    pub table: &'a SymbolTable,
}

fn count_column(count: usize) -> String {
    format!("({count})")
}

/// # Errors
/// Returns an error if writing fails
pub fn write_backtrace_stats<W: Write>(
    out: &mut W,
    stats: &BacktraceStats,
) -> Result<(), ProfileError> {
    writeln!(out, "{}\n", stats.summary())?;
    Ok(())
}

/// Top callers followed by each one's ranked callees.
///
/// # Errors
/// Returns an error if writing fails
pub fn write_graph_report<W: Write>(out: &mut W, graph: &CallGraph) -> Result<(), ProfileError> {
    let top = graph.top_callers();

    writeln!(out, "==== TOP CALLERS ====")?;
    for caller in &top {
        writeln!(
            out,
            "{:<35} {:6.4} {:>6}",
            caller.name,
            caller.fraction,
            count_column(caller.samples)
        )?;
    }

    writeln!(out, "==== CALLEES ====")?;
    writeln!(out)?;
    for caller in &top {
        writeln!(
            out,
            "{:<35} {:6.4} {:>6}",
            caller.name,
            caller.fraction,
            count_column(caller.samples)
        )?;
        for callee in &caller.callees {
            writeln!(
                out,
                "\t{:<35} {:6.4} {:>6}",
                callee.name,
                callee.attributed_fraction,
                count_column(callee.calls)
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// One address-space section, optionally with annotated disassembly after
/// each function.
///
/// # Errors
/// Returns an error if writing fails, a ranked function is missing from the
/// annotator's table, or disassembly fails
pub fn write_flat_section<W: Write>(
    out: &mut W,
    section: &FlatSection,
    annotator: Option<&Annotator<'_>>,
) -> Result<(), ProfileError> {
    writeln!(out, "==== {} ====", section.title)?;
    for hotspot in &section.hotspots {
        writeln!(
            out,
            "{:<35} {:6.4} {:>6} ({:6.4})",
            hotspot.name,
            hotspot.fraction,
            count_column(hotspot.count),
            hotspot.cumulative
        )?;
        if let Some(annotator) = annotator {
            write_annotated_disassembly(out, section, &hotspot.name, annotator)?;
        }
    }
    writeln!(out, "---------")?;
    writeln!(out, "total {:6.2}", section.total_fraction)?;
    Ok(())
}

fn write_annotated_disassembly<W: Write>(
    out: &mut W,
    section: &FlatSection,
    function: &str,
    annotator: &Annotator<'_>,
) -> Result<(), ProfileError> {
    let range = annotator.table.find_by_name(function)?;
    let lines = annotator.disassembler.disassemble(annotator.binary, range.low, range.high)?;
    let counts = section.resolution.address_counts(function);

    for line in lines {
        let hits = counts.get(&line.address).copied().unwrap_or(0);
        writeln!(out, "{hits:6} {}", line.text)?;
    }
    Ok(())
}

/// Kernel then user section.
///
/// # Errors
/// Returns an error if either section fails to render
pub fn write_flat_report<W: Write>(
    out: &mut W,
    report: &FlatReport,
    kernel: Option<&Annotator<'_>>,
    user: Option<&Annotator<'_>>,
) -> Result<(), ProfileError> {
    write_flat_section(out, &report.kernel, kernel)?;
    write_flat_section(out, &report.user, user)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_flat_profile;
    use crate::domain::{Backtrace, Rip};
    use crate::symbolization::{DisassemblyLine, Symbol};
    use std::collections::HashMap;

    struct FakeDisassembler;

    impl Disassembler for FakeDisassembler {
        fn disassemble(
            &self,
            _binary: &Path,
            low: u64,
            _high: u64,
        ) -> Result<Vec<DisassemblyLine>, ProfileError> {
            Ok((0..2)
                .map(|i| DisassemblyLine {
                    address: low + i,
                    text: format!("{:x}:\tnop", low + i),
                })
                .collect())
        }
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<(), ProfileError>>(f: F) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_flat_section_layout() {
        let table = SymbolTable::from_symbols(vec![Symbol::new("foo", 0xff00)]);
        let mut samples = vec![Rip::kernel(0xff00); 3];
        samples.push(Rip::kernel(0xff01));
        let report = analyze_flat_profile(&samples, &table, &SymbolTable::default()).unwrap();

        let text = render(|out| write_flat_section(out, &report.kernel, None));
        let expected = format!(
            "==== KERNEL TIME ====\n{:<35} 1.0000    (4) (1.0000)\n---------\ntotal   1.00\n",
            "foo"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_annotated_section_counts_exact_addresses() {
        let table = SymbolTable::from_symbols(vec![Symbol::new("foo", 0xff00)]);
        let samples = [Rip::kernel(0xff00), Rip::kernel(0xff00), Rip::kernel(0xff01)];
        let report = analyze_flat_profile(&samples, &table, &SymbolTable::default()).unwrap();
        let annotator =
            Annotator { disassembler: &FakeDisassembler, binary: Path::new("kernel"), table: &table };

        let text = render(|out| write_flat_section(out, &report.kernel, Some(&annotator)));
        assert!(text.contains("     2 ff00:\tnop\n"));
        assert!(text.contains("     1 ff01:\tnop\n"));
    }

    #[test]
    fn test_annotated_section_prints_zero_for_unsampled_instruction() {
        let table = SymbolTable::from_symbols(vec![Symbol::new("foo", 0xff00)]);
        let samples = [Rip::kernel(0xff01), Rip::kernel(0xff01), Rip::kernel(0xff01)];
        let report = analyze_flat_profile(&samples, &table, &SymbolTable::default()).unwrap();
        let annotator =
            Annotator { disassembler: &FakeDisassembler, binary: Path::new("kernel"), table: &table };

        let text = render(|out| write_flat_section(out, &report.kernel, Some(&annotator)));
        assert!(text.contains("     0 ff00:\tnop\n"));
        assert!(text.contains("     3 ff01:\tnop\n"));
    }

    #[test]
    fn test_annotation_with_unknown_function_fails() {
        let table = SymbolTable::from_symbols(vec![Symbol::new("foo", 0xff00)]);
        let report =
            analyze_flat_profile(&[Rip::kernel(0xff00)], &table, &SymbolTable::default()).unwrap();
        let other = SymbolTable::from_symbols(vec![Symbol::new("bar", 0xff00)]);
        let annotator =
            Annotator { disassembler: &FakeDisassembler, binary: Path::new("kernel"), table: &other };

        let mut buffer = Vec::new();
        let err = write_flat_section(&mut buffer, &report.kernel, Some(&annotator)).unwrap_err();
        assert!(matches!(err, ProfileError::SymbolNotFound(ref n) if n == "foo"));
    }

    #[test]
    fn test_graph_report_layout() {
        let symbols = HashMap::from([(0x10, "leaf".to_string()), (0x20, "root".to_string())]);
        let backtraces =
            vec![Backtrace { frames: vec![Rip::kernel(0x10), Rip::kernel(0x20)], failed: false }];
        let graph = CallGraph::build(&backtraces, &symbols).unwrap();

        let text = render(|out| write_graph_report(out, &graph));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "==== TOP CALLERS ====");
        assert_eq!(lines[1], format!("{:<35} 1.0000    (1)", "leaf"));
        assert_eq!(lines[2], format!("{:<35} 1.0000    (1)", "root"));
        assert_eq!(lines[3], "==== CALLEES ====");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], format!("{:<35} 1.0000    (1)", "leaf"));
        assert_eq!(lines[6], format!("{:<35} 1.0000    (1)", "root"));
        assert_eq!(lines[7], format!("\t{:<35} 1.0000    (1)", "leaf"));
    }

    #[test]
    fn test_backtrace_stats_line() {
        let stats = BacktraceStats { total: 4, failed: 1 };
        let text = render(|out| write_backtrace_stats(out, &stats));
        assert_eq!(text, "backtrace failed for 25.00% (1 / 4)\n\n");
    }
}
