//! Address-range symbol table built from a symbol dump.

use log::info;
use serde::Serialize;
use std::path::Path;

use crate::domain::{ProfileError, MAX_ADDRESS};
use crate::symbolization::SymbolSource;

/// A symbol start address as reported by the symbol dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
}

impl Symbol {
    #[must_use]
    pub fn new(name: impl Into<String>, address: u64) -> Self {
        Self { name: name.into(), address }
    }
}

/// A function's address range, `low` inclusive and `high` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRange {
    pub name: String,
    pub low: u64,
    pub high: u64,
}

impl SymbolRange {
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.low && addr < self.high
    }
}

/// Contiguous, non-overlapping ranges sorted by low bound.
///
/// Immutable once built. Contiguity follows from construction and is not
/// checked against the binary.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    ranges: Vec<SymbolRange>,
}

impl SymbolTable {
    /// Build the range table from symbol start addresses in any order.
    ///
    /// Symbols are sorted by address with a stable sort, so symbols sharing
    /// an address keep their dump order. Duplicates are kept: the earlier
    /// one gets an empty range and never owns a sample.
    #[must_use]
    pub fn from_symbols(mut symbols: Vec<Symbol>) -> Self {
        symbols.sort_by_key(|s| s.address);

        let highs: Vec<u64> = symbols
            .iter()
            .skip(1)
            .map(|s| s.address)
            .chain(std::iter::once(MAX_ADDRESS))
            .collect();

        let ranges = symbols
            .into_iter()
            .zip(highs)
            .map(|(sym, high)| SymbolRange { name: sym.name, low: sym.address, high })
            .collect();

        Self { ranges }
    }

    /// Dump the symbols of `binary` through `source` and build the table.
    ///
    /// # Errors
    /// Returns an error if the symbol dump fails
    pub fn load(source: &dyn SymbolSource, binary: &Path) -> Result<Self, ProfileError> {
        let symbols = source.symbols(binary)?;
        let table = Self::from_symbols(symbols);
        info!("Loaded {} symbol ranges from {}", table.len(), binary.display());
        Ok(table)
    }

    #[must_use]
    pub fn ranges(&self) -> &[SymbolRange] {
        &self.ranges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Look up a function's range by name (first match in address order).
    ///
    /// # Errors
    /// Returns `SymbolNotFound` if no range carries that name
    pub fn find_by_name(&self, name: &str) -> Result<&SymbolRange, ProfileError> {
        self.ranges
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ProfileError::SymbolNotFound(name.to_string()))
    }
}
