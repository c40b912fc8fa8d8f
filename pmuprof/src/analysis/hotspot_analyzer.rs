//! Flat per-function time attribution.
//!
//! Samples are split by address space, each half is resolved against its
//! own binary's symbol table, and functions are ranked by sample count.
//! Fractions are always taken over the samples of the whole run, so the
//! kernel and user sections add up to 1.0 together.
//!
//! ```text
//! ==== KERNEL TIME ====
//! copy_page                           0.4213   (812) (0.4213)
//! pmap_walk                           0.1101   (212) (0.5314)
//! ```

// Percentage calculations intentionally convert usize to f64
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

use crate::domain::{AddressSpace, ProfileError, Rip};
use crate::symbolization::{resolve_sorted, Resolution, SymbolTable};

/// A function's share of the sampled time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionHotspot {
    pub name: String,

    /// Samples attributed to this function.
    pub count: usize,

    /// `count` over all samples of the run (0.0 - 1.0).
    pub fraction: f64,

    /// Running total of `fraction` down the ranking, this row included.
    pub cumulative: f64,
}

/// Ranked hotspots of one address space.
#[derive(Debug, Clone, Serialize)]
pub struct FlatSection {
    pub title: String,
    pub space: AddressSpace,
    pub hotspots: Vec<FunctionHotspot>,

    /// Samples in this section.
    pub samples: usize,

    /// `samples` over all samples of the run.
    pub total_fraction: f64,

    /// Per-function addresses, kept for instruction-level annotation.
    #[serde(skip)]
    pub resolution: Resolution,
}

/// Flat profile of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct FlatReport {
    pub total_samples: usize,
    pub kernel: FlatSection,
    pub user: FlatSection,
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Rank the samples of one address space.
///
/// `total_samples` is the denominator for every fraction.
///
/// # Errors
/// Returns `AddressNotFound` if a sample lies outside `table`
pub fn analyze_section(
    title: &str,
    space: AddressSpace,
    samples: &[Rip],
    table: &SymbolTable,
    total_samples: usize,
) -> Result<FlatSection, ProfileError> {
    let mut addrs: Vec<u64> =
        samples.iter().filter(|rip| rip.space == space).map(|rip| rip.value).collect();
    addrs.sort_unstable();

    let resolution = resolve_sorted(&addrs, table)?;

    let mut running = 0;
    let hotspots = resolution
        .ranking
        .iter()
        .map(|(count, name)| {
            running += count;
            FunctionHotspot {
                name: name.clone(),
                count: *count,
                fraction: fraction(*count, total_samples),
                cumulative: fraction(running, total_samples),
            }
        })
        .collect();

    Ok(FlatSection {
        title: title.to_string(),
        space,
        hotspots,
        samples: addrs.len(),
        total_fraction: fraction(addrs.len(), total_samples),
        resolution,
    })
}

/// Build the kernel and user sections for all flat samples.
///
/// # Errors
/// Returns `AddressNotFound` if any sample lies outside its binary's table
pub fn analyze_flat_profile(
    samples: &[Rip],
    kernel_table: &SymbolTable,
    user_table: &SymbolTable,
) -> Result<FlatReport, ProfileError> {
    let total_samples = samples.len();
    let kernel =
        analyze_section("KERNEL TIME", AddressSpace::Kernel, samples, kernel_table, total_samples)?;
    let user = analyze_section("USER TIME", AddressSpace::User, samples, user_table, total_samples)?;

    Ok(FlatReport { total_samples, kernel, user })
}
