//! Randomized Cache Invariants.
//!
//! Replays arbitrary access sequences and checks properties that must hold after
//! every access regardless of the pattern:
//!
//! - Hits plus misses equal accesses, per operation type.
//! - A set never holds more valid lines than ways, and never the same tag twice.
//! - Age-counter and usage-stack recency produce identical caches.
//! - With an L2, every L1 miss is one L2 read and every L1 writeback is one L2 write.

use cachesim_core::cache::Cache;
use cachesim_core::common::AccessType;
use cachesim_core::config::RecencyTracking;
use proptest::prelude::*;

use crate::common::harness::{cache, cache_with};

/// Addresses confined to a small window so sets fill up and evict.
fn access() -> impl Strategy<Value = (AccessType, u32)> {
    (
        prop_oneof![Just(AccessType::Read), Just(AccessType::Write)],
        0u32..0x2000,
    )
}

fn accesses() -> impl Strategy<Value = Vec<(AccessType, u32)>> {
    prop::collection::vec(access(), 1..400)
}

fn assert_sets_well_formed(c: &Cache) {
    for set in c.contents() {
        assert!(set.lines.len() <= c.geometry().ways());
        let mut tags: Vec<u32> = set.lines.iter().map(|l| l.tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), set.lines.len(), "duplicate tag in set {}", set.index);
    }
}

proptest! {
    #[test]
    fn counters_are_consistent(trace in accesses()) {
        let mut c = cache(512, 4, 32);
        let mut hits = 0u64;
        for &(op, addr) in &trace {
            if c.access(op, addr, None) {
                hits += 1;
            }
        }
        let s = c.stats();
        prop_assert_eq!(s.accesses(), trace.len() as u64);
        prop_assert_eq!(s.read_hits() + s.write_hits(), hits);
        prop_assert_eq!(s.memory_reads, s.misses());
        prop_assert_eq!(s.memory_writes, s.writebacks);
        prop_assert!(s.writebacks <= s.misses());
        prop_assert!((0.0..=1.0).contains(&s.miss_rate()));
    }

    #[test]
    fn sets_never_overflow_or_duplicate(trace in accesses(), ways in 1usize..=8) {
        let mut c = cache(ways * 32 * 4, ways, 32);
        for &(op, addr) in &trace {
            let _ = c.access(op, addr, None);
            assert_sets_well_formed(&c);
        }
    }

    #[test]
    fn accessed_block_is_resident_afterwards(trace in accesses()) {
        let mut c = cache(256, 2, 32);
        for &(op, addr) in &trace {
            let _ = c.access(op, addr, None);
            prop_assert!(c.contains(addr));
            if op.is_write() {
                prop_assert_eq!(c.is_dirty(addr), Some(true));
            }
        }
    }

    #[test]
    fn recency_mechanisms_are_equivalent(trace in accesses(), ways in 1usize..=8) {
        let size = ways * 16 * 8;
        let mut age = cache_with(size, ways, 16, RecencyTracking::Age);
        let mut stack = cache_with(size, ways, 16, RecencyTracking::Stack);
        for &(op, addr) in &trace {
            prop_assert_eq!(age.access(op, addr, None), stack.access(op, addr, None));
        }
        prop_assert_eq!(age.stats(), stack.stats());
        prop_assert_eq!(age.contents(), stack.contents());
    }

    #[test]
    fn l2_sees_exactly_l1_misses_and_writebacks(trace in accesses()) {
        let mut l1 = cache(256, 2, 32);
        let mut l2 = cache(1024, 4, 32);
        for &(op, addr) in &trace {
            let _ = l1.access(op, addr, Some(&mut l2));
        }
        let (s1, s2) = (l1.stats(), l2.stats());
        prop_assert_eq!(s2.reads, s1.misses());
        prop_assert_eq!(s2.writes, s1.writebacks);
        prop_assert_eq!(s1.memory_reads, 0);
        prop_assert_eq!(s1.memory_writes, 0);
        prop_assert_eq!(s2.memory_reads, s2.misses());
    }
}
