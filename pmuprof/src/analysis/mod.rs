//! Analysis logic for profiling data
//!
//! This module contains the aggregation behind both reports, separated from
//! text rendering:
//! - Flat per-function time attribution (`hotspot_analyzer`)
//! - Caller/callee graph over backtraces (`call_graph`)

pub mod call_graph;
pub mod hotspot_analyzer;

pub use call_graph::{
    kernel_symbol_map, CallGraph, CallerSummary, CalleeShare, GraphNode, NodeId,
    TOP_CALLER_THRESHOLD, USER_NODE,
};
pub use hotspot_analyzer::{
    analyze_flat_profile, analyze_section, FlatReport, FlatSection, FunctionHotspot,
};
