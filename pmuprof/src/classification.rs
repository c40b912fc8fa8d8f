//! Address space classification for sampled instruction pointers.
//!
//! Samples from the kernel and from the profiled user program arrive in one
//! log. They are told apart by a fixed prefix of the textual address: the
//! user program is linked at a known base, so its addresses always print
//! with the same leading digits. This is a static policy and deliberately
//! not derived from either symbol table.
//!
//! ```text
//! 00002c8000401a20   → user
//! 0000000000412f80   → kernel
//! ffffffff80101000   → kernel
//! ```

use crate::domain::{AddressSpace, Rip};

/// Leading digits of every user-space address in the profile log.
pub const USER_PREFIX: &str = "00002c8";

/// Classify a textual address from the profile log, in either hex case.
#[must_use]
pub fn classify_address(text: &str) -> AddressSpace {
    let prefix = text.get(..USER_PREFIX.len());
    if prefix.is_some_and(|p| p.eq_ignore_ascii_case(USER_PREFIX)) {
        AddressSpace::User
    } else {
        AddressSpace::Kernel
    }
}

/// Parse a hex address from the log and classify it.
///
/// Accepts an optional `0x` prefix. The prefix check runs on the text as
/// written, before the conversion strips leading zeros.
///
/// # Errors
/// Returns the offending text when it is not a hex number that fits in 64 bits.
pub fn parse_rip(text: &str) -> Result<Rip, String> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let value = u64::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid hex address {text:?}: {e}"))?;
    Ok(Rip { value, space: classify_address(digits) })
}
