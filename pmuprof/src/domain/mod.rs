//! Domain model for pmuprof
//!
//! This module contains core domain types and errors that provide:
//! - Typed sample addresses that remember which address space they came from
//! - Structured error handling for the whole pipeline

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{AddressSpace, Backtrace, Rip, MAX_ADDRESS};

pub use errors::ProfileError;
