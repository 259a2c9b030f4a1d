//! Shared type tests.


/// Error messages.
pub mod error;
