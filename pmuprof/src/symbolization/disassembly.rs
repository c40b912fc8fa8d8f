//! Per-function disassembly via `objdump`.

use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::ProfileError;

/// One instruction line of a disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassemblyLine {
    pub address: u64,
    pub text: String,
}

/// Produces disassembly for an address range of a binary.
pub trait Disassembler {
    /// Disassemble `[low, high)` of `binary`.
    ///
    /// # Errors
    /// Returns an error if the binary cannot be disassembled
    fn disassemble(
        &self,
        binary: &Path,
        low: u64,
        high: u64,
    ) -> Result<Vec<DisassemblyLine>, ProfileError>;
}

/// Runs `objdump -d` over a single function's range.
#[derive(Debug, Clone)]
pub struct ObjdumpDisassembler {
    objdump: PathBuf,
}

impl ObjdumpDisassembler {
    #[must_use]
    pub fn new(objdump: impl Into<PathBuf>) -> Self {
        Self { objdump: objdump.into() }
    }
}

impl Default for ObjdumpDisassembler {
    fn default() -> Self {
        Self::new("objdump")
    }
}

impl Disassembler for ObjdumpDisassembler {
    fn disassemble(
        &self,
        binary: &Path,
        low: u64,
        high: u64,
    ) -> Result<Vec<DisassemblyLine>, ProfileError> {
        let tool = self.objdump.display().to_string();
        let tool_failed = |error: String| ProfileError::ToolFailed {
            tool: tool.clone(),
            binary: binary.display().to_string(),
            error,
        };

        info!("Running {tool} -d on {} [{low:#x}, {high:#x})", binary.display());
        let output = Command::new(&self.objdump)
            .arg("-d")
            .arg(format!("--start-address={low:#x}"))
            .arg(format!("--stop-address={high:#x}"))
            .arg("--no-show-raw-insn")
            .arg(binary)
            .output()
            .map_err(|e| tool_failed(e.to_string()))?;

        if !output.status.success() {
            return Err(tool_failed(format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(parse_disassembly(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Keep only lines that start with `<hex-address>:`.
///
/// The file banner, section headers and the `<function>:` label line are
/// dropped.
#[must_use]
pub fn parse_disassembly(text: &str) -> Vec<DisassemblyLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.contains("file format"))
        .filter_map(|line| {
            let first = line.split_whitespace().next()?;
            let addr = first.strip_suffix(':')?;
            let address = u64::from_str_radix(addr, 16).ok()?;
            Some(DisassemblyLine { address, text: line.to_string() })
        })
        .collect()
}
