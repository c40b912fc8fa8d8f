//! Core value types shared by the parser, resolver and call graph.

use serde::Serialize;
use std::fmt;

/// Exclusive upper bound of the last symbol range.
pub const MAX_ADDRESS: u64 = u64::MAX;

/// Which binary a sampled address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSpace {
    Kernel,
    User,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSpace::Kernel => write!(f, "kernel"),
            AddressSpace::User => write!(f, "user"),
        }
    }
}

/// A sampled instruction pointer.
///
/// The address space is decided from the textual form in the log, so it
/// has to be captured before the leading zeros are lost to the numeric
/// conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rip {
    pub value: u64,
    pub space: AddressSpace,
}

impl Rip {
    #[must_use]
    pub fn kernel(value: u64) -> Self {
        Self { value, space: AddressSpace::Kernel }
    }

    #[must_use]
    pub fn user(value: u64) -> Self {
        Self { value, space: AddressSpace::User }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.space == AddressSpace::User
    }
}

impl fmt::Display for Rip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.value)
    }
}

/// One stack sample, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backtrace {
    pub frames: Vec<Rip>,
    /// Closed by the failed-trace marker instead of the normal one.
    pub failed: bool,
}
