//! Trace-driven cache hierarchy simulator library.
//!
//! This crate models a two-level, set-associative, write-back write-allocate cache
//! hierarchy with LRU replacement and replays a memory-access trace against it:
//! 1. **Cache:** Address decoding, associative lookup, LRU victim selection, dirty tracking.
//! 2. **Hierarchy:** L1 with an optional L2, misses forwarded level by level down to memory.
//! 3. **Trace:** Streaming parser for `r`/`w` + hexadecimal address records.
//! 4. **Statistics:** Per-level counters, derived miss rates and the end-of-run report.
//!
//! There is no timing model, no prefetching and no coherence: behaviour is purely
//! address-level and fully deterministic.

/// Cache level, geometry and replacement policies.
pub mod cache;
/// Common types (access types, errors).
pub mod common;
/// Simulator configuration (defaults, per-level and hierarchy-wide structures).
pub mod config;
/// Hierarchy driver and trace reader.
pub mod sim;
/// Access statistics and reporting.
pub mod stats;

/// One cache level; construct with `Cache::new`.
pub use crate::cache::Cache;
/// Root configuration type; use `Config::from_params` or deserialize from JSON.
pub use crate::config::Config;
/// L1 + optional L2 driver; construct with `CacheHierarchy::new`.
pub use crate::sim::CacheHierarchy;
