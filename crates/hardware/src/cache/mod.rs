//! Set-Associative Cache Level.
//!
//! This module implements one level of a write-back, write-allocate (WBWA) cache
//! hierarchy with LRU replacement. The same type models L1 and L2; only the
//! configuration differs. It provides:
//! 1. **Lookup:** Tag match within the set selected by the address.
//! 2. **Allocation:** Victim selection (invalid ways first, then LRU), dirty writeback
//!    and block fetch from the next level or from memory.
//! 3. **Reporting:** Per-set contents in MRU-to-LRU order and access counters.
//!
//! A level never owns the level below it: the next level is passed to every
//! [`Cache::access`] call as `Option<&mut Cache>`, with `None` meaning main memory.

/// Geometry derivation and address decoding.
pub mod geometry;

/// Cache replacement policy implementations.
pub mod policies;

use std::fmt;
use std::io;

use serde::Serialize;
use tracing::{debug, trace};

use self::geometry::Geometry;
use self::policies::ReplacementPolicy;
use crate::common::{AccessType, ConfigError};
use crate::config::CacheConfig;
use crate::stats::AccessStats;

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CacheLine {
    tag: u32,
    valid: bool,
    dirty: bool,
}

/// A valid line as reported by [`Cache::contents`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LineView {
    /// Stored tag.
    pub tag: u32,
    /// Whether the line differs from the next level.
    pub dirty: bool,
}

/// The valid lines of one set, most recently used first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetContents {
    /// Set index.
    pub index: usize,
    /// Valid lines, MRU to LRU.
    pub lines: Vec<LineView>,
}

impl fmt::Display for SetContents {
    /// Formats as `set {index:>6}:   {tag:x}[ D] ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set {:>6}:   ", self.index)?;
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:x}", line.tag)?;
            if line.dirty {
                write!(f, " D")?;
            }
        }
        Ok(())
    }
}

/// One level of the cache hierarchy.
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    geometry: Geometry,
    lines: Vec<CacheLine>,
    policy: Box<dyn ReplacementPolicy>,
    stats: AccessStats,
}

impl Cache {
    /// Creates a cache level with every line invalid.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration does not describe a
    /// well-formed geometry; no cache is built in that case.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let num_sets = geometry.num_sets();
        let ways = geometry.ways();

        debug!(
            cache = %config.name,
            size = config.size_bytes,
            ways,
            line = config.line_bytes,
            sets = num_sets,
            recency = ?config.recency,
            "cache level constructed"
        );

        Ok(Self {
            config: config.clone(),
            geometry,
            lines: vec![CacheLine::default(); num_sets * ways],
            policy: policies::build(config.recency, num_sets, ways),
            stats: AccessStats::default(),
        })
    }

    /// Level configuration.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Derived geometry.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Access counters accumulated since construction or the last [`Cache::reset`].
    pub const fn stats(&self) -> &AccessStats {
        &self.stats
    }

    fn set_lines(&self, set: usize) -> &[CacheLine] {
        let base = set * self.geometry.ways();
        &self.lines[base..base + self.geometry.ways()]
    }

    fn find_way(&self, set: usize, tag: u32) -> Option<usize> {
        self.set_lines(set)
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Lowest invalid way if any, otherwise the LRU way.
    fn choose_victim(&self, set: usize) -> usize {
        self.set_lines(set)
            .iter()
            .position(|line| !line.valid)
            .unwrap_or_else(|| self.policy.get_victim(set))
    }

    /// Checks whether the block holding `addr` is resident, without touching any state.
    pub fn contains(&self, addr: u32) -> bool {
        let set = self.geometry.index(addr);
        let tag = self.geometry.tag(addr);
        self.find_way(set, tag).is_some()
    }

    /// Returns whether the resident block holding `addr` is dirty, or `None` if absent.
    pub fn is_dirty(&self, addr: u32) -> Option<bool> {
        let set = self.geometry.index(addr);
        let tag = self.geometry.tag(addr);
        self.find_way(set, tag)
            .map(|way| self.set_lines(set)[way].dirty)
    }

    /// Accesses `addr` in this level.
    ///
    /// On a miss the block is allocated (both reads and writes allocate); a dirty victim
    /// is written back and the new block is fetched, from `next_level` if present or
    /// from memory otherwise. The next level is accessed with no further level below it.
    ///
    /// # Returns
    ///
    /// `true` on a hit in this level, `false` on a miss (even if the next level hit).
    pub fn access(
        &mut self,
        op: AccessType,
        addr: u32,
        next_level: Option<&mut Cache>,
    ) -> bool {
        let set = self.geometry.index(addr);
        let tag = self.geometry.tag(addr);

        match op {
            AccessType::Read => self.stats.reads += 1,
            AccessType::Write => self.stats.writes += 1,
        }

        if let Some(way) = self.find_way(set, tag) {
            if op.is_write() {
                self.lines[set * self.geometry.ways() + way].dirty = true;
            }
            self.policy.update(set, way);
            trace!(cache = %self.config.name, %op, addr = format_args!("{addr:#x}"), set, way, "hit");
            return true;
        }

        match op {
            AccessType::Read => self.stats.read_misses += 1,
            AccessType::Write => self.stats.write_misses += 1,
        }
        trace!(cache = %self.config.name, %op, addr = format_args!("{addr:#x}"), set, "miss");

        self.allocate_on_miss(op, addr, next_level);
        false
    }

    /// Evicts a victim from the set of `addr` and fills it with the block of `addr`.
    fn allocate_on_miss(&mut self, op: AccessType, addr: u32, mut next_level: Option<&mut Cache>) {
        let set = self.geometry.index(addr);
        let tag = self.geometry.tag(addr);
        let way = self.choose_victim(set);
        let idx = set * self.geometry.ways() + way;

        let victim = self.lines[idx];
        if victim.valid && victim.dirty {
            let victim_addr = self.geometry.block_address(victim.tag, set);
            self.writeback_down(victim_addr, next_level.as_deref_mut());
        }

        let block = self.geometry.block_align(addr);
        match next_level {
            Some(next) => {
                let _ = next.access(AccessType::Read, block, None);
            }
            None => self.stats.memory_reads += 1,
        }

        self.lines[idx] = CacheLine {
            tag,
            valid: true,
            dirty: op.is_write(),
        };
        self.policy.update(set, way);
    }

    /// Pushes a dirty victim to the next level, or to memory when there is none.
    fn writeback_down(&mut self, victim_addr: u32, next_level: Option<&mut Cache>) {
        trace!(
            cache = %self.config.name,
            victim = format_args!("{victim_addr:#x}"),
            to_memory = next_level.is_none(),
            "writeback"
        );
        match next_level {
            Some(next) => {
                let _ = next.access(AccessType::Write, victim_addr, None);
            }
            None => self.stats.memory_writes += 1,
        }
        self.stats.writebacks += 1;
    }

    /// Valid lines of every non-empty set, each set ordered MRU to LRU.
    ///
    /// Sets without any valid line are omitted.
    pub fn contents(&self) -> Vec<SetContents> {
        (0..self.geometry.num_sets())
            .filter_map(|set| {
                let lines = self.set_lines(set);
                let valid: Vec<LineView> = self
                    .policy
                    .recency_order(set)
                    .into_iter()
                    .map(|way| lines[way])
                    .filter(|line| line.valid)
                    .map(|line| LineView {
                        tag: line.tag,
                        dirty: line.dirty,
                    })
                    .collect();
                (!valid.is_empty()).then_some(SetContents {
                    index: set,
                    lines: valid,
                })
            })
            .collect()
    }

    /// Writes [`Cache::contents`] one set per line.
    ///
    /// # Errors
    ///
    /// Propagates any error from `out`.
    pub fn print_contents(&self, out: &mut dyn io::Write) -> io::Result<()> {
        for set in self.contents() {
            writeln!(out, "{set}")?;
        }
        Ok(())
    }

    /// Restores the construction-time state: all lines invalid, recency reset,
    /// counters zeroed.
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
        self.policy.reset();
        self.stats = AccessStats::default();
    }
}
