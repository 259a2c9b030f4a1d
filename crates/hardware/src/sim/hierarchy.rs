//! Cache Hierarchy Driver.
//!
//! Owns L1 and the optional L2 for the duration of a run and replays trace records
//! against them. The L1 to L2 link is never stored inside a cache; it is lent to L1
//! as `Option<&mut Cache>` for the span of each access.

use tracing::{debug, info};

use crate::cache::Cache;
use crate::common::{AccessType, ConfigError, SimError, TraceError};
use crate::config::Config;
use crate::sim::trace::TraceRecord;

/// L1 plus an optional L2, terminated by main memory.
#[derive(Debug)]
pub struct CacheHierarchy {
    l1: Cache,
    l2: Option<Cache>,
}

impl CacheHierarchy {
    /// Builds every level described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] of L1, then L2.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let l1 = Cache::new(&config.l1_cache())?;
        let l2 = config.l2_cache().as_ref().map(Cache::new).transpose()?;
        debug!(has_l2 = l2.is_some(), "cache hierarchy built");
        Ok(Self { l1, l2 })
    }

    /// Assembles a hierarchy from already-built levels.
    pub const fn from_levels(l1: Cache, l2: Option<Cache>) -> Self {
        Self { l1, l2 }
    }

    /// First level.
    pub const fn l1(&self) -> &Cache {
        &self.l1
    }

    /// Second level, if configured.
    pub const fn l2(&self) -> Option<&Cache> {
        self.l2.as_ref()
    }

    /// Replays one access; returns whether it hit in L1.
    pub fn access(&mut self, op: AccessType, addr: u32) -> bool {
        self.l1.access(op, addr, self.l2.as_mut())
    }

    /// Replays every record of `records` in order.
    ///
    /// Each record, including the accesses it cascades into L2, completes before the
    /// next one is pulled.
    ///
    /// # Returns
    ///
    /// The number of records replayed.
    ///
    /// # Errors
    ///
    /// Stops at the first [`TraceError`]; no partial result is returned.
    pub fn run<I>(&mut self, records: I) -> Result<u64, SimError>
    where
        I: IntoIterator<Item = Result<TraceRecord, TraceError>>,
    {
        let mut count = 0;
        for record in records {
            let record = record?;
            let _ = self.access(record.op, record.addr);
            count += 1;
        }
        info!(records = count, "trace replay finished");
        Ok(count)
    }

    /// Memory reads plus memory writes across all levels.
    pub fn memory_traffic(&self) -> u64 {
        self.l1.stats().memory_traffic()
            + self.l2.as_ref().map_or(0, |l2| l2.stats().memory_traffic())
    }

    /// Resets every level to its construction-time state.
    pub fn reset(&mut self) {
        self.l1.reset();
        if let Some(l2) = &mut self.l2 {
            l2.reset();
        }
    }
}
