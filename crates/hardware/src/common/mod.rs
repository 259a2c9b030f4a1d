//! Common types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by the cache, the driver and the CLI:
//! 1. **Memory Access:** Read/Write classification of trace records.
//! 2. **Error Handling:** Configuration, trace and top-level simulation errors.

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::AccessType;
pub use error::{ConfigError, SimError, TraceError};
