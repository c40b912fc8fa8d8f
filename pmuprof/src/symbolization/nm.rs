//! Symbol dumps via `nm`.

use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::ProfileError;
use crate::symbolization::Symbol;

/// Supplies the symbol start addresses of a binary.
pub trait SymbolSource {
    /// # Errors
    /// Returns an error if the binary cannot be inspected
    fn symbols(&self, binary: &Path) -> Result<Vec<Symbol>, ProfileError>;
}

/// Runs `nm -C` and parses its output.
#[derive(Debug, Clone)]
pub struct NmSymbolSource {
    nm: PathBuf,
}

impl NmSymbolSource {
    #[must_use]
    pub fn new(nm: impl Into<PathBuf>) -> Self {
        Self { nm: nm.into() }
    }
}

impl Default for NmSymbolSource {
    fn default() -> Self {
        Self::new("nm")
    }
}

impl SymbolSource for NmSymbolSource {
    fn symbols(&self, binary: &Path) -> Result<Vec<Symbol>, ProfileError> {
        let tool = self.nm.display().to_string();
        info!("Running {tool} -C {}", binary.display());

        let output = Command::new(&self.nm).arg("-C").arg(binary).output().map_err(|e| {
            ProfileError::ToolFailed {
                tool: tool.clone(),
                binary: binary.display().to_string(),
                error: e.to_string(),
            }
        })?;

        if !output.status.success() {
            return Err(ProfileError::ToolFailed {
                tool,
                binary: binary.display().to_string(),
                error: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let symbols = parse_symbol_dump(&String::from_utf8_lossy(&output.stdout));
        info!("{tool} reported {} symbols for {}", symbols.len(), binary.display());
        Ok(symbols)
    }
}

/// Parse `<hex-address> <type-char> <name>` lines.
///
/// Lines are put in byte order first, so symbols sharing an address come
/// out ordered by the rest of the dump line (type char, then name). Lines
/// without an address
/// (undefined symbols) or with a non-hex address are skipped. Demangled
/// names may contain spaces and are kept whole.
#[must_use]
pub fn parse_symbol_dump(text: &str) -> Vec<Symbol> {
    let mut lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines.sort_unstable();

    lines
        .into_iter()
        .filter_map(|line| {
            let mut parts = line.splitn(3, char::is_whitespace);
            let addr = parts.next()?;
            let _kind = parts.next()?;
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let address = u64::from_str_radix(addr, 16).ok()?;
            Some(Symbol::new(name, address))
        })
        .collect()
}
