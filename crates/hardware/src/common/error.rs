//! Error definitions.
//!
//! Every error in the simulator is fatal for the run. This module provides:
//! 1. **Configuration Errors:** Geometry that cannot be decomposed into tag/index/offset.
//! 2. **Trace Errors:** Malformed records and I/O failures while reading a trace.
//! 3. **Simulation Errors:** The top-level error returned by the driver and CLI.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid cache geometry, rejected at construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Block (line) size must be a non-zero power of two.
    #[error("{cache}: block size {line_bytes} is not a power of two")]
    BlockSizeNotPowerOfTwo {
        /// Name of the offending cache level.
        cache: String,
        /// Requested block size in bytes.
        line_bytes: usize,
    },

    /// Associativity must be at least one way.
    #[error("{cache}: associativity must be at least 1")]
    ZeroAssociativity {
        /// Name of the offending cache level.
        cache: String,
    },

    /// Capacity must be non-zero.
    #[error("{cache}: capacity must be greater than 0")]
    ZeroCapacity {
        /// Name of the offending cache level.
        cache: String,
    },

    /// Capacity must be an exact multiple of `ways * line_bytes`.
    #[error("{cache}: capacity {size_bytes} is not divisible by {ways} ways x {line_bytes} bytes")]
    CapacityNotDivisible {
        /// Name of the offending cache level.
        cache: String,
        /// Requested capacity in bytes.
        size_bytes: usize,
        /// Requested associativity.
        ways: usize,
        /// Requested block size in bytes.
        line_bytes: usize,
    },

    /// The derived set count must be a power of two for the index mask.
    #[error("{cache}: {num_sets} sets is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Name of the offending cache level.
        cache: String,
        /// Derived number of sets.
        num_sets: usize,
    },

    /// Offset and index together do not fit in a 32-bit address.
    #[error("{cache}: {bits} offset+index bits exceed the 32-bit address width")]
    AddressTooNarrow {
        /// Name of the offending cache level.
        cache: String,
        /// Sum of offset and index bits.
        bits: u32,
    },
}

/// Malformed trace input.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Operation character outside `{r, R, w, W}`.
    #[error("line {line}: unknown request type '{op}'")]
    UnknownOperation {
        /// The offending character.
        op: char,
        /// 1-based line number.
        line: usize,
    },

    /// An operation character was not followed by an address.
    #[error("line {line}: request has no address")]
    MissingAddress {
        /// 1-based line number of the operation character.
        line: usize,
    },

    /// The address token is not a hexadecimal 32-bit value.
    #[error("line {line}: invalid address '{token}'")]
    InvalidAddress {
        /// The offending token.
        token: String,
        /// 1-based line number.
        line: usize,
    },

    /// Underlying reader failure.
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),
}

/// Top-level simulation error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid cache geometry.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Malformed trace.
    #[error("invalid trace: {0}")]
    Trace(#[from] TraceError),

    /// The trace or configuration file could not be opened.
    #[error("unable to open file {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A JSON configuration could not be parsed, or a report could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the report failed.
    #[error("output failed: {0}")]
    Output(#[from] io::Error),
}
