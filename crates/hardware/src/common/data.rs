//! Memory Access Types.
//!
//! This module defines the classification of trace records replayed against the
//! cache hierarchy. These types are used for the following:
//! 1. **Counter Selection:** Choosing between the read and write counters of a level.
//! 2. **Dirty Tracking:** Writes mark lines dirty under the write-back policy.
//! 3. **Trace Decoding:** Mapping the operation character of a trace record.

use std::fmt;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access.
    ///
    /// Demand loads from the trace and block fetches issued by an upper level on a miss.
    Read,

    /// Data write access.
    ///
    /// Demand stores from the trace and dirty-victim writebacks issued by an upper level.
    Write,
}

impl AccessType {
    /// Decodes a trace operation character (`r`/`R` or `w`/`W`).
    ///
    /// Returns `None` for any other character.
    pub const fn from_char(op: char) -> Option<Self> {
        match op {
            'r' | 'R' => Some(Self::Read),
            'w' | 'W' => Some(Self::Write),
            _ => None,
        }
    }

    /// Returns `true` for [`AccessType::Write`].
    #[inline(always)]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "r"),
            Self::Write => write!(f, "w"),
        }
    }
}
