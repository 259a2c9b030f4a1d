//! Cache Replacement Policies.
//!
//! Recency bookkeeping and victim selection for set-associative caches. Victims are
//! only requested from sets whose every way holds a valid line; the cache itself prefers
//! the lowest-numbered invalid way whenever one exists.
//!
//! # Policies
//!
//! - `AgeLru`: per-line age counters, 0 = most recently used.
//! - `StackLru`: per-set usage stack, front = most recently used.
//!
//! Both are exact LRU and agree on every victim and on every MRU-to-LRU ordering of
//! the valid lines of a set.

/// Age-counter LRU.
pub mod age;

/// Usage-stack LRU.
pub mod lru;

pub use age::AgeLruPolicy;
pub use lru::StackLruPolicy;

use std::fmt;

use crate::config::RecencyTracking;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Marks `way` of `set` as most recently used.
    fn update(&mut self, set: usize, way: usize);

    /// Selects the way to evict from a fully valid `set`.
    fn get_victim(&self, set: usize) -> usize;

    /// Lists the ways of `set` from most to least recently used.
    fn recency_order(&self, set: usize) -> Vec<usize>;

    /// Restores the construction-time state of every set.
    fn reset(&mut self);
}

/// Builds the policy selected by `recency`.
pub fn build(recency: RecencyTracking, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match recency {
        RecencyTracking::Age => Box::new(AgeLruPolicy::new(sets, ways)),
        RecencyTracking::Stack => Box::new(StackLruPolicy::new(sets, ways)),
    }
}
