//! Simulation driver and trace input.
//!
//! Provides the hierarchy that owns every cache level and the reader that turns a
//! text trace into access records.

/// L1/L2 composition and trace replay.
pub mod hierarchy;

/// Trace file parsing.
pub mod trace;

pub use hierarchy::CacheHierarchy;
pub use trace::{TraceReader, TraceRecord};
