//! # Symbol Resolution
//!
//! This module turns raw instruction pointers from the PMU log into function
//! names. Unlike a DWARF symbolizer it works from a flat symbol dump: every
//! symbol contributes a start address, and a function is assumed to extend
//! up to the start of the next symbol.
//!
//! ## Address Range Table
//!
//! ```text
//! symbol dump (any order)          sorted ranges
//! ─────────────────────────        ─────────────────────────────────────
//! 0000ff18 T f3                    f1  [0xff00, 0xff08)
//! 0000ff00 T f1        ──sort──▶   f2  [0xff08, 0xff18)
//! 0000ff08 t f2                    f3  [0xff18, u64::MAX)
//! ```
//!
//! Ranges are contiguous by construction: the high bound of range *i* is
//! the low bound of range *i + 1*. Nothing checks that a symbol really is
//! that long; the dump gives no sizes.
//!
//! ## Merge-Scan Resolution
//!
//! Resolution takes the sampled addresses **sorted ascending** and walks the
//! range table with a single forward cursor, so a whole profile resolves in
//! O(n + m). The cursor never moves backward: an address below the current
//! range (unsorted input, or an address before the first symbol) is an
//! [`AddressNotFound`](crate::domain::ProfileError::AddressNotFound) error,
//! as is one past the end of the table.
//!
//! ## Collaborators
//!
//! Symbol dumps and disassembly come from external tools behind two traits,
//! so the core can be driven with in-memory data:
//!
//! - [`SymbolSource`]: `nm -C <binary>` via [`NmSymbolSource`]
//! - [`Disassembler`]: `objdump -d` via [`ObjdumpDisassembler`]
//!
//! ## Example
//!
//! ```rust
//! use pmuprof::symbolization::{resolve_sorted, Symbol, SymbolTable};
//!
//! let table = SymbolTable::from_symbols(vec![
//!     Symbol::new("foo", 0xff00),
//!     Symbol::new("bar", 0xff02),
//! ]);
//! let resolution = resolve_sorted(&[0xff00, 0xff01, 0xff03], &table).unwrap();
//! assert_eq!(resolution.ranking, vec![(2, "foo".to_string()), (1, "bar".to_string())]);
//! ```

pub mod disassembly;
pub mod nm;
pub mod resolver;
pub mod symbol_table;

pub use disassembly::{parse_disassembly, Disassembler, DisassemblyLine, ObjdumpDisassembler};
pub use nm::{parse_symbol_dump, NmSymbolSource, SymbolSource};
pub use resolver::{resolve_sorted, Resolution};
pub use symbol_table::{Symbol, SymbolRange, SymbolTable};
