//! Forward merge-scan from sorted addresses to owning symbols.

use log::debug;
use std::collections::HashMap;

use crate::domain::ProfileError;
use crate::symbolization::{SymbolRange, SymbolTable};

/// Addresses grouped by owning function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Function name → resolved addresses, in input order with duplicates
    /// kept so each entry is one sample.
    pub by_symbol: HashMap<String, Vec<u64>>,

    /// `(sample count, name)`, count descending then name ascending.
    pub ranking: Vec<(usize, String)>,
}

impl Resolution {
    /// Total number of resolved addresses.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_symbol.values().map(Vec::len).sum()
    }

    /// Sample count per exact address inside `function`.
    #[must_use]
    pub fn address_counts(&self, function: &str) -> HashMap<u64, usize> {
        let mut counts = HashMap::new();
        for &addr in self.by_symbol.get(function).into_iter().flatten() {
            *counts.entry(addr).or_insert(0) += 1;
        }
        counts
    }

    /// Flatten into an address → function lookup.
    #[must_use]
    pub fn address_map(&self) -> HashMap<u64, String> {
        self.by_symbol
            .iter()
            .flat_map(|(name, addrs)| addrs.iter().map(move |&a| (a, name.clone())))
            .collect()
    }
}

/// Resolve ascending `addresses` against `table` in a single pass.
///
/// The range cursor only moves forward. An address that precedes the
/// current range (input not sorted, or below the first symbol) or that
/// runs past the last range cannot be attributed and fails the whole call.
///
/// # Errors
/// Returns `AddressNotFound` for the first address with no owning range
pub fn resolve_sorted(addresses: &[u64], table: &SymbolTable) -> Result<Resolution, ProfileError> {
    let ranges = table.ranges();
    let mut by_symbol: HashMap<String, Vec<u64>> = HashMap::new();
    let mut cursor = 0;

    for &addr in addresses {
        cursor = advance(ranges, cursor, addr)?;
        by_symbol.entry(ranges[cursor].name.clone()).or_default().push(addr);
    }

    let ranking = rank_by_count(&by_symbol);
    debug!("Resolved {} addresses into {} functions", addresses.len(), ranking.len());

    Ok(Resolution { by_symbol, ranking })
}

/// Move `cursor` to the range owning `addr`.
fn advance(ranges: &[SymbolRange], mut cursor: usize, addr: u64) -> Result<usize, ProfileError> {
    while cursor < ranges.len() && ranges[cursor].high <= addr {
        cursor += 1;
    }
    match ranges.get(cursor) {
        Some(range) if range.contains(addr) => Ok(cursor),
        _ => Err(ProfileError::AddressNotFound(addr)),
    }
}

fn rank_by_count(by_symbol: &HashMap<String, Vec<u64>>) -> Vec<(usize, String)> {
    let mut ranking: Vec<(usize, String)> =
        by_symbol.iter().map(|(name, addrs)| (addrs.len(), name.clone())).collect();
    ranking.sort_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolization::Symbol;

    fn table() -> SymbolTable {
        SymbolTable::from_symbols(vec![
            Symbol::new("f1", 0xff00),
            Symbol::new("f2", 0xff08),
            Symbol::new("f3", 0xff18),
        ])
    }

    #[test]
    fn test_resolve_groups_by_function() {
        let res = resolve_sorted(&[0xff00, 0xff07, 0xff08, 0xff20, 0xff20], &table()).unwrap();

        assert_eq!(res.by_symbol["f1"], vec![0xff00, 0xff07]);
        assert_eq!(res.by_symbol["f2"], vec![0xff08]);
        assert_eq!(res.by_symbol["f3"], vec![0xff20, 0xff20]);
        assert_eq!(res.total(), 5);
    }

    #[test]
    fn test_ranking_breaks_ties_by_name() {
        let res = resolve_sorted(&[0xff00, 0xff08, 0xff18, 0xff19], &table()).unwrap();

        assert_eq!(
            res.ranking,
            vec![(2, "f3".to_string()), (1, "f1".to_string()), (1, "f2".to_string())]
        );
    }

    #[test]
    fn test_counts_sum_to_input_length() {
        let addrs: Vec<u64> = (0xff00..0xff40).flat_map(|a| [a, a]).collect();
        let res = resolve_sorted(&addrs, &table()).unwrap();

        let summed: usize = res.ranking.iter().map(|(count, _)| count).sum();
        assert_eq!(summed, addrs.len());
    }

    #[test]
    fn test_address_below_first_range_fails() {
        let err = resolve_sorted(&[0xfeff], &table()).unwrap_err();
        assert!(matches!(err, ProfileError::AddressNotFound(0xfeff)));
    }

    #[test]
    fn test_address_past_last_range_fails() {
        let err = resolve_sorted(&[0xff00, u64::MAX], &table()).unwrap_err();
        assert!(matches!(err, ProfileError::AddressNotFound(u64::MAX)));
    }

    #[test]
    fn test_unsorted_input_fails_instead_of_misattributing() {
        let err = resolve_sorted(&[0xff20, 0xff00], &table()).unwrap_err();
        assert!(matches!(err, ProfileError::AddressNotFound(0xff00)));
    }

    #[test]
    fn test_empty_table_rejects_everything() {
        let empty = SymbolTable::default();
        assert!(resolve_sorted(&[0x1], &empty).is_err());
        assert_eq!(resolve_sorted(&[], &empty).unwrap(), Resolution::default());
    }

    #[test]
    fn test_zero_width_duplicate_never_owns_samples() {
        let t = SymbolTable::from_symbols(vec![
            Symbol::new("first", 0x100),
            Symbol::new("second", 0x100),
        ]);
        let res = resolve_sorted(&[0x100, 0x180], &t).unwrap();

        assert!(!res.by_symbol.contains_key("first"));
        assert_eq!(res.by_symbol["second"].len(), 2);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let addrs = [0xff00, 0xff09, 0xff09, 0xff30];
        let first = resolve_sorted(&addrs, &table()).unwrap();
        let second = resolve_sorted(&addrs, &table()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_address_counts_and_address_map() {
        let res = resolve_sorted(&[0xff00, 0xff00, 0xff03, 0xff08], &table()).unwrap();

        let counts = res.address_counts("f1");
        assert_eq!(counts, HashMap::from([(0xff00, 2), (0xff03, 1)]));
        assert!(!counts.contains_key(&0xff01));
        assert!(res.address_counts("nope").is_empty());

        let map = res.address_map();
        assert_eq!(map[&0xff00], "f1");
        assert_eq!(map[&0xff08], "f2");
    }
}
