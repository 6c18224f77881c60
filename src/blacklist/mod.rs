//! Blacklist data structure and loading.
//!
//! The blacklist is built once at startup and never mutated afterwards.
//! That immutability is what lets the per-packet path query it from any
//! number of threads without locks.

pub mod loader;

use std::collections::HashSet;
use std::net::Ipv4Addr;

pub use loader::FileLoader;

/// A compiled set of blacklisted source addresses.
///
/// Entries are kept in insertion order (the order they appeared in the
/// source file) alongside a hash index so membership checks on the hot
/// path stay O(1) regardless of set size.
#[derive(Debug, Clone, Default)]
pub struct AddressSet {
    /// Entries in file order. Duplicates are kept, not rejected.
    entries: Vec<Ipv4Addr>,
    /// Hash index for hot-path membership checks.
    index: HashSet<Ipv4Addr>,
}

impl AddressSet {
    /// Create a new address set from a list of addresses.
    pub fn new<I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let entries: Vec<Ipv4Addr> = addrs.into_iter().collect();
        let index = entries.iter().copied().collect();
        Self { entries, index }
    }

    /// Check whether an address is blacklisted.
    #[inline]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.index.contains(&addr)
    }

    /// Returns the number of loaded entries, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The loaded addresses in file order.
    #[must_use]
    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn should_contain_every_loaded_address() {
        let set = AddressSet::new([addr("10.0.0.1"), addr("10.0.0.2"), addr("192.168.1.1")]);

        assert!(set.contains(addr("10.0.0.1")));
        assert!(set.contains(addr("10.0.0.2")));
        assert!(set.contains(addr("192.168.1.1")));
        assert!(!set.contains(addr("10.0.0.3")));
    }

    #[test]
    fn should_preserve_insertion_order() {
        let set = AddressSet::new([addr("192.168.1.1"), addr("10.0.0.1"), addr("172.16.0.1")]);

        assert_eq!(
            set.addresses(),
            &[addr("192.168.1.1"), addr("10.0.0.1"), addr("172.16.0.1")]
        );
    }

    #[test]
    fn should_keep_duplicates_in_entry_count() {
        let set = AddressSet::new([addr("10.0.0.1"), addr("10.0.0.1")]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(addr("10.0.0.1")));
    }

    #[test]
    fn should_report_empty_set() {
        let set = AddressSet::default();

        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains(addr("10.0.0.1")));
    }

    #[test]
    fn should_answer_membership_deterministically() {
        let set = AddressSet::new([addr("203.0.113.7")]);

        for _ in 0..3 {
            assert!(set.contains(addr("203.0.113.7")));
            assert!(!set.contains(addr("203.0.113.8")));
        }
    }
}
