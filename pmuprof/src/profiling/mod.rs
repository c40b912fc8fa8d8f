//! Profile log ingestion
//!
//! This module turns the raw PMU sample log into typed samples:
//! - Format detection (flat vs backtrace log)
//! - Weighted flat samples and innermost-first backtraces
//! - Backtrace collection statistics

pub mod backtrace_stats;
pub mod profile_parser;

// Re-export common types
pub use backtrace_stats::BacktraceStats;
pub use profile_parser::{
    parse_profile, read_profile, LogFormat, ParsedProfile, FAILED_SENTINEL, MAX_FLAT_SAMPLES,
    TRACE_SENTINEL,
};
