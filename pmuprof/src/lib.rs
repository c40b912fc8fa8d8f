//! # pmuprof - PMU Sample Attribution for a Kernel and its Userland
//!
//! pmuprof post-processes the raw instruction-pointer samples collected by
//! the performance-monitoring unit while a kernel and one user program ran,
//! and answers two questions: *where did the time go* (per-function sample
//! shares) and, when the log carries backtraces, *who calls whom* (a
//! weighted call graph).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐     ┌──────────────────────────────────┐
//! │   PMU sample log (text)  │     │   kernel binary   user binary    │
//! └────────────┬─────────────┘     └────────────────┬─────────────────┘
//!              │                                    │ nm -C / objdump -d
//!              ▼                                    ▼
//!      ┌──────────────┐                     ┌──────────────┐
//!      │  Profiling   │                     │ Symbolization│
//!      │   (parser)   │                     │ (range table)│
//!      └──────┬───────┘                     └──────┬───────┘
//!             │ samples / backtraces               │
//!             └─────────────┬──────────────────────┘
//!                           ▼
//!                   ┌──────────────┐      ┌──────────────┐
//!                   │   Analysis   │─────▶│    Report    │──▶ stdout
//!                   │ (flat, graph)│      │    (text)    │
//!                   └──────┬───────┘      └──────────────┘
//!                          ▼
//!                   ┌──────────────┐
//!                   │    Export    │──▶ graph.dot, report.json
//!                   └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`profiling`]: Sample log parsing (flat and backtrace formats) and
//!   backtrace collection statistics
//! - [`classification`]: Kernel/user split of sampled addresses
//! - [`symbolization`]: Symbol dump → contiguous address ranges, and the
//!   forward merge-scan resolver
//! - [`analysis`]: Flat per-function attribution and the call graph
//! - [`report`]: Run pipeline and plain-text rendering
//! - [`export`]: Graphviz and JSON output
//! - [`cli`]: Command-line arguments
//! - [`preflight`]: Input validation before any tool runs
//! - [`domain`]: Core value types and errors
//!
//! ## Log Formats
//!
//! A **flat log** has one `<address> <field> <count>` line per sampled
//! address. A **backtrace log** has bare addresses, innermost frame first,
//! with traces separated by `deadbeefdeadbeef` (or `feedfacefeedface` when
//! the preceding trace was truncated).
//!
//! ## Typical Usage
//!
//! ```bash
//! # Flat time per function
//! pmuprof prof.txt kernel.elf user.elf
//!
//! # Backtrace log, with graph export and annotated disassembly
//! pmuprof -b -d bt.txt kernel.elf user.elf
//! ```

pub mod analysis;
pub mod classification;
pub mod cli;
pub mod domain;
pub mod export;
pub mod preflight;
pub mod profiling;
pub mod report;
pub mod symbolization;
