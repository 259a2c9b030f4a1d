//! Cache Level Unit Tests.
//!
//! Exercises a single `Cache` with no next level (misses go to memory) and a pair of
//! levels wired by hand. Covers hit/miss logic, write-allocate fills, LRU eviction,
//! dirty writebacks, contents ordering and reset.

use cachesim_core::cache::{Cache, LineView, SetContents};
use cachesim_core::common::AccessType::{Read, Write};
use cachesim_core::stats::AccessStats;
use pretty_assertions::assert_eq;

use crate::common::harness::{cache, colliding, init_tracing};

// ──────────────────────────────────────────────────────────
// Helper: build a simple test cache
// ──────────────────────────────────────────────────────────

/// 256 bytes, 32-byte lines, 2 ways:
///   - num_sets = 256 / (2 * 32) = 4
///   - set      = (addr >> 5) & 3
///   - tag      = addr >> 7
///
/// 0x000, 0x080, 0x100, 0x180 all map to set 0 with tags 0, 1, 2, 3.
fn test_cache() -> Cache {
    init_tracing();
    cache(256, 2, 32)
}

const A: u32 = 0x000;
const B: u32 = 0x080;
const C: u32 = 0x100;

// ══════════════════════════════════════════════════════════
// 1. Cold Miss / Warm Hit
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_fetches_from_memory() {
    let mut c = test_cache();
    assert!(!c.access(Read, 0x1000, None), "First access should be a miss");

    let s = c.stats();
    assert_eq!(s.reads, 1);
    assert_eq!(s.read_misses, 1);
    assert_eq!(s.memory_reads, 1);
    assert_eq!(s.writebacks, 0);
}

#[test]
fn warm_hit_after_fill() {
    let mut c = test_cache();
    let _ = c.access(Read, 0x1000, None);
    assert!(c.access(Read, 0x1000, None), "Second access should hit");
    assert_eq!(c.stats().memory_reads, 1, "Hits do not touch memory");
}

#[test]
fn same_block_different_offset_hits() {
    let mut c = test_cache();
    let _ = c.access(Read, 0x1000, None);
    assert!(c.access(Read, 0x1000 + 31, None));
    assert!(!c.access(Read, 0x1000 + 32, None), "Next block is a different line");
}

// ══════════════════════════════════════════════════════════
// 2. Write-Allocate and Dirty Tracking
// ══════════════════════════════════════════════════════════

#[test]
fn write_miss_allocates_dirty_line() {
    let mut c = test_cache();
    assert!(!c.access(Write, A, None));

    assert_eq!(c.is_dirty(A), Some(true));
    let s = c.stats();
    assert_eq!(s.writes, 1);
    assert_eq!(s.write_misses, 1);
    assert_eq!(s.memory_reads, 1, "Write-allocate fetches the block");
    assert_eq!(s.memory_writes, 0, "Write-back defers the store");
}

#[test]
fn write_hit_marks_clean_line_dirty() {
    let mut c = test_cache();
    let _ = c.access(Read, A, None);
    assert_eq!(c.is_dirty(A), Some(false));

    assert!(c.access(Write, A, None));
    assert_eq!(c.is_dirty(A), Some(true));
    assert_eq!(c.stats().write_misses, 0);
}

#[test]
fn repeated_read_hit_changes_nothing_but_recency() {
    let mut c = test_cache();
    let _ = c.access(Read, A, None);
    let _ = c.access(Read, B, None);
    let before = c.contents();

    assert!(c.access(Read, B, None));
    assert!(c.access(Read, B, None));

    assert_eq!(c.contents(), before, "B was already MRU");
    assert_eq!(c.is_dirty(B), Some(false));
    assert!(c.contains(A));
}

// ══════════════════════════════════════════════════════════
// 3. LRU Eviction
// ══════════════════════════════════════════════════════════

#[test]
fn third_conflicting_block_evicts_lru() {
    let mut c = test_cache();
    let _ = c.access(Read, A, None);
    let _ = c.access(Read, B, None);

    assert!(!c.access(Read, C, None));
    assert!(!c.contains(A), "LRU victim should be evicted");
    assert!(c.contains(B));
    assert!(c.contains(C));
}

#[test]
fn reaccess_protects_line_from_eviction() {
    let mut c = test_cache();
    let _ = c.access(Read, A, None);
    let _ = c.access(Read, B, None);
    let _ = c.access(Read, A, None);

    let _ = c.access(Read, C, None);
    assert!(c.contains(A));
    assert!(!c.contains(B), "B became LRU after A was re-accessed");
}

#[test]
fn n_plus_one_distinct_tags_evict_oldest() {
    init_tracing();
    let mut c = cache(1024, 4, 32);
    let blocks: Vec<u32> = (0..5).map(|n| colliding(&c, 3, n)).collect();

    for &addr in &blocks {
        assert!(!c.access(Read, addr, None));
    }
    assert!(!c.contains(blocks[0]), "Fifth block evicted the first");
    assert!(!c.access(Read, blocks[0], None));
    assert!(!c.contains(blocks[1]), "Re-fetching the first evicted the second");
    assert_eq!(c.stats().read_misses, 6);
}

#[test]
fn other_sets_are_untouched_by_eviction() {
    let mut c = test_cache();
    let other = 0x020; // set 1
    let _ = c.access(Read, other, None);
    for addr in [A, B, C, 0x180] {
        let _ = c.access(Read, addr, None);
    }
    assert!(c.contains(other));
}

// ══════════════════════════════════════════════════════════
// 4. Writebacks
// ══════════════════════════════════════════════════════════

#[test]
fn dirty_eviction_writes_back_to_memory() {
    let mut c = test_cache();
    let _ = c.access(Write, A, None);
    let _ = c.access(Read, B, None);
    let _ = c.access(Read, C, None);

    let s = c.stats();
    assert_eq!(s.writebacks, 1);
    assert_eq!(s.memory_writes, 1);
    assert_eq!(s.memory_reads, 3);
}

#[test]
fn clean_eviction_does_not_write_back() {
    let mut c = test_cache();
    for addr in [A, B, C] {
        let _ = c.access(Read, addr, None);
    }
    assert_eq!(c.stats().writebacks, 0);
    assert_eq!(c.stats().memory_writes, 0);
}

#[test]
fn dirty_eviction_writes_back_to_next_level() {
    init_tracing();
    let mut l1 = test_cache();
    let mut l2 = cache(1024, 4, 32);

    let _ = l1.access(Write, A, Some(&mut l2));
    let _ = l1.access(Read, B, Some(&mut l2));
    let _ = l1.access(Read, C, Some(&mut l2));

    let s1 = l1.stats();
    assert_eq!(s1.writebacks, 1);
    assert_eq!(s1.memory_writes, 0, "L2 absorbs the writeback");
    assert_eq!(s1.memory_reads, 0, "L2 serves every fetch");

    let s2 = l2.stats();
    assert_eq!(s2.reads, 3, "One block fetch per L1 miss");
    assert_eq!(s2.read_misses, 3);
    assert_eq!(s2.writes, 1);
    assert_eq!(s2.write_misses, 0, "Victim block was fetched through L2 earlier");
    assert_eq!(l2.is_dirty(A), Some(true));
}

#[test]
fn writeback_precedes_fetch_in_next_level() {
    init_tracing();
    // Single-line L2: the writeback of 0x00 hits and dirties it, then the fetch of
    // 0x40 evicts it, producing an L2 writeback to memory.
    let mut l1 = cache(64, 1, 32);
    let mut l2 = cache(32, 1, 32);

    let _ = l1.access(Write, 0x00, Some(&mut l2));
    let _ = l1.access(Read, 0x40, Some(&mut l2));

    let s2 = l2.stats();
    assert_eq!(s2.reads, 2);
    assert_eq!(s2.writes, 1);
    assert_eq!(s2.write_misses, 0, "Writeback arrived before the fetch displaced 0x00");
    assert_eq!(s2.writebacks, 1);
    assert_eq!(s2.memory_writes, 1);
    assert_eq!(s2.memory_reads, 2);
    assert!(l2.contains(0x40));
    assert!(!l2.contains(0x00));
}

// ══════════════════════════════════════════════════════════
// 5. Contents and Counters
// ══════════════════════════════════════════════════════════

#[test]
fn contents_are_mru_first_and_skip_empty_sets() {
    let mut c = test_cache();
    let _ = c.access(Write, A, None);
    let _ = c.access(Read, B, None);
    let _ = c.access(Read, 0x060, None); // set 3, tag 0

    assert_eq!(
        c.contents(),
        vec![
            SetContents {
                index: 0,
                lines: vec![
                    LineView { tag: 1, dirty: false },
                    LineView { tag: 0, dirty: true },
                ],
            },
            SetContents {
                index: 3,
                lines: vec![LineView { tag: 0, dirty: false }],
            },
        ]
    );
}

#[test]
fn print_contents_format() {
    let mut c = test_cache();
    let _ = c.access(Write, A, None);
    let _ = c.access(Read, B, None);

    let mut out = Vec::new();
    c.print_contents(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "set      0:   1 0 D\n");
}

#[test]
fn hits_plus_misses_equal_accesses() {
    let mut c = test_cache();
    for (op, addr) in [(Read, A), (Write, A), (Read, B), (Write, C), (Read, A), (Read, C)] {
        let _ = c.access(op, addr, None);
    }
    let s = c.stats();
    assert_eq!(s.read_hits() + s.read_misses, s.reads);
    assert_eq!(s.write_hits() + s.write_misses, s.writes);
    assert_eq!(s.prefetches_issued, 0);
}

#[test]
fn reset_restores_construction_state() {
    let mut c = test_cache();
    for addr in [A, B, C] {
        let _ = c.access(Write, addr, None);
    }
    c.reset();

    assert_eq!(*c.stats(), AccessStats::default());
    assert!(c.contents().is_empty());
    assert!(!c.contains(B));
    assert!(!c.access(Read, B, None));
}
