//! Simulation statistics collection and reporting.
//!
//! This module tracks and reports the behaviour of the cache hierarchy. It provides:
//! 1. **Counters:** Per-level reads, writes, misses, writebacks and memory traffic.
//! 2. **Derived metrics:** Hits, miss rates and total memory traffic.
//! 3. **Report:** Configuration echo, per-level contents and the measurement table,
//!    printable as text or serializable as JSON.

use std::io;

use serde::Serialize;

use crate::cache::{Cache, SetContents};
use crate::config::Config;

/// Access counters of one cache level.
///
/// Counters only grow during a run; [`Cache::reset`] is the only way to zero them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccessStats {
    /// Read accesses seen by this level.
    pub reads: u64,
    /// Reads that missed.
    pub read_misses: u64,
    /// Write accesses seen by this level.
    pub writes: u64,
    /// Writes that missed.
    pub write_misses: u64,
    /// Dirty victims pushed down, to the next level or to memory.
    pub writebacks: u64,
    /// Block fetches served directly by memory.
    pub memory_reads: u64,
    /// Writebacks that reached memory.
    pub memory_writes: u64,
    /// Prefetches issued (no prefetcher is modeled; always 0).
    pub prefetches_issued: u64,
    /// Prefetched blocks later demanded (always 0).
    pub prefetches_useful: u64,
    /// Prefetches that arrived too late (always 0).
    pub prefetches_late: u64,
}

/// Ratio with the convention that an empty denominator yields 0.0.
fn safe_rate(misses: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        misses as f64 / total as f64
    }
}

impl AccessStats {
    /// Reads that hit.
    pub const fn read_hits(&self) -> u64 {
        self.reads - self.read_misses
    }

    /// Writes that hit.
    pub const fn write_hits(&self) -> u64 {
        self.writes - self.write_misses
    }

    /// Reads plus writes.
    pub const fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Read misses plus write misses.
    pub const fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// `(read_misses + write_misses) / (reads + writes)`, 0.0 when idle.
    pub fn miss_rate(&self) -> f64 {
        safe_rate(self.misses(), self.accesses())
    }

    /// `read_misses / reads`, 0.0 when no reads occurred.
    ///
    /// Used for L2, whose reads are all demand fetches from L1.
    pub fn read_miss_rate(&self) -> f64 {
        safe_rate(self.read_misses, self.reads)
    }

    /// Memory reads plus memory writes issued by this level.
    pub const fn memory_traffic(&self) -> u64 {
        self.memory_reads + self.memory_writes
    }
}

/// Contents and counters of one level at the end of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelReport {
    /// Level name.
    pub name: String,
    /// Non-empty sets, MRU to LRU.
    pub contents: Vec<SetContents>,
    /// Final counters.
    pub stats: AccessStats,
}

impl LevelReport {
    /// Snapshots `cache`.
    pub fn from_cache(cache: &Cache) -> Self {
        Self {
            name: cache.config().name.clone(),
            contents: cache.contents(),
            stats: *cache.stats(),
        }
    }
}

/// The measurement table (items a. through q.).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurements {
    /// a. L1 reads.
    pub l1_reads: u64,
    /// b. L1 read misses.
    pub l1_read_misses: u64,
    /// c. L1 writes.
    pub l1_writes: u64,
    /// d. L1 write misses.
    pub l1_write_misses: u64,
    /// e. L1 miss rate.
    pub l1_miss_rate: f64,
    /// f. L1 writebacks.
    pub l1_writebacks: u64,
    /// g. L1 prefetches.
    pub l1_prefetches: u64,
    /// h. L2 demand reads.
    pub l2_reads_demand: u64,
    /// i. L2 demand read misses.
    pub l2_read_misses_demand: u64,
    /// j. L2 prefetch reads.
    pub l2_reads_prefetch: u64,
    /// k. L2 prefetch read misses.
    pub l2_read_misses_prefetch: u64,
    /// l. L2 writes.
    pub l2_writes: u64,
    /// m. L2 write misses.
    pub l2_write_misses: u64,
    /// n. L2 demand miss rate.
    pub l2_miss_rate: f64,
    /// o. L2 writebacks.
    pub l2_writebacks: u64,
    /// p. L2 prefetches.
    pub l2_prefetches: u64,
    /// q. Total memory traffic.
    pub memory_traffic: u64,
}

impl Measurements {
    /// Computes the table from the final counters; a missing L2 reports zeros.
    pub fn new(l1: &AccessStats, l2: Option<&AccessStats>) -> Self {
        let l2 = l2.copied().unwrap_or_default();
        Self {
            l1_reads: l1.reads,
            l1_read_misses: l1.read_misses,
            l1_writes: l1.writes,
            l1_write_misses: l1.write_misses,
            l1_miss_rate: l1.miss_rate(),
            l1_writebacks: l1.writebacks,
            l1_prefetches: l1.prefetches_issued,
            l2_reads_demand: l2.reads,
            l2_read_misses_demand: l2.read_misses,
            l2_reads_prefetch: 0,
            l2_read_misses_prefetch: 0,
            l2_writes: l2.writes,
            l2_write_misses: l2.write_misses,
            l2_miss_rate: l2.read_miss_rate(),
            l2_writebacks: l2.writebacks,
            l2_prefetches: l2.prefetches_issued,
            memory_traffic: l1.memory_traffic() + l2.memory_traffic(),
        }
    }

    fn rows(&self) -> [(&'static str, String); 17] {
        [
            ("a. L1 reads:", self.l1_reads.to_string()),
            ("b. L1 read misses:", self.l1_read_misses.to_string()),
            ("c. L1 writes:", self.l1_writes.to_string()),
            ("d. L1 write misses:", self.l1_write_misses.to_string()),
            ("e. L1 miss rate:", format!("{:.4}", self.l1_miss_rate)),
            ("f. L1 writebacks:", self.l1_writebacks.to_string()),
            ("g. L1 prefetches:", self.l1_prefetches.to_string()),
            ("h. L2 reads (demand):", self.l2_reads_demand.to_string()),
            ("i. L2 read misses (demand):", self.l2_read_misses_demand.to_string()),
            ("j. L2 reads (prefetch):", self.l2_reads_prefetch.to_string()),
            ("k. L2 read misses (prefetch):", self.l2_read_misses_prefetch.to_string()),
            ("l. L2 writes:", self.l2_writes.to_string()),
            ("m. L2 write misses:", self.l2_write_misses.to_string()),
            ("n. L2 miss rate:", format!("{:.4}", self.l2_miss_rate)),
            ("o. L2 writebacks:", self.l2_writebacks.to_string()),
            ("p. L2 prefetches:", self.l2_prefetches.to_string()),
            ("q. memory traffic:", self.memory_traffic.to_string()),
        ]
    }
}

/// Section names for selective report output.
///
/// Pass an empty slice to [`Report::write_sections`] to write all sections.
pub const REPORT_SECTIONS: &[&str] = &["configuration", "contents", "measurements"];

/// End-of-run report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Configuration the run used.
    pub config: Config,
    /// Trace file name as echoed in the configuration block.
    pub trace_file: String,
    /// L1 snapshot.
    pub l1: LevelReport,
    /// L2 snapshot, if the level exists.
    pub l2: Option<LevelReport>,
    /// Measurement table.
    pub measurements: Measurements,
}

impl Report {
    /// Snapshots the levels of a finished run.
    pub fn new(config: &Config, trace_file: impl Into<String>, l1: &Cache, l2: Option<&Cache>) -> Self {
        let measurements = Measurements::new(l1.stats(), l2.map(Cache::stats));
        Self {
            config: config.clone(),
            trace_file: trace_file.into(),
            l1: LevelReport::from_cache(l1),
            l2: l2.map(LevelReport::from_cache),
            measurements,
        }
    }

    /// Writes the requested sections.
    ///
    /// Each element of `sections` should be one of [`REPORT_SECTIONS`]; an empty slice
    /// writes everything.
    ///
    /// # Errors
    ///
    /// Propagates any error from `out`.
    pub fn write_sections(&self, out: &mut dyn io::Write, sections: &[String]) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("configuration") {
            let c = &self.config;
            writeln!(out, "===== Simulator configuration =====")?;
            writeln!(out, "BLOCKSIZE:  {}", c.block_size)?;
            writeln!(out, "L1_SIZE:    {}", c.l1.size_bytes)?;
            writeln!(out, "L1_ASSOC:   {}", c.l1.ways)?;
            writeln!(out, "L2_SIZE:    {}", c.l2.size_bytes)?;
            writeln!(out, "L2_ASSOC:   {}", c.l2.ways)?;
            writeln!(out, "PREF_N:     {}", c.prefetch.n)?;
            writeln!(out, "PREF_M:     {}", c.prefetch.m)?;
            writeln!(out, "trace_file: {}", self.trace_file)?;
            writeln!(out)?;
        }
        if want("contents") {
            write_level(out, &self.l1)?;
            if let Some(l2) = &self.l2 {
                writeln!(out)?;
                write_level(out, l2)?;
            }
            writeln!(out)?;
        }
        if want("measurements") {
            writeln!(out, "===== Measurements =====")?;
            for (label, value) in self.measurements.rows() {
                writeln!(out, "{label:<31}{value}")?;
            }
        }
        Ok(())
    }

    /// Writes every section.
    ///
    /// # Errors
    ///
    /// Propagates any error from `out`.
    pub fn write(&self, out: &mut dyn io::Write) -> io::Result<()> {
        self.write_sections(out, &[])
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which cannot occur for this type in practice.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_level(out: &mut dyn io::Write, level: &LevelReport) -> io::Result<()> {
    writeln!(out, "===== {} contents =====", level.name)?;
    for set in &level.contents {
        writeln!(out, "{set}")?;
    }
    Ok(())
}
