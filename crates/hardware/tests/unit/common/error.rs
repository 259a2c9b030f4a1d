//! Error Display and conversion tests.

use std::error::Error as _;
use std::io;
use std::path::PathBuf;

use cachesim_core::common::{ConfigError, SimError, TraceError};

#[test]
fn config_error_messages() {
    let err = ConfigError::CapacityNotDivisible {
        cache: "L1".into(),
        size_bytes: 1000,
        ways: 2,
        line_bytes: 32,
    };
    assert_eq!(
        err.to_string(),
        "L1: capacity 1000 is not divisible by 2 ways x 32 bytes"
    );

    let err = ConfigError::SetCountNotPowerOfTwo {
        cache: "L2".into(),
        num_sets: 3,
    };
    assert_eq!(err.to_string(), "L2: 3 sets is not a power of two");
}

#[test]
fn trace_error_messages() {
    let err = TraceError::InvalidAddress {
        token: "0xZZ".into(),
        line: 12,
    };
    assert_eq!(err.to_string(), "line 12: invalid address '0xZZ'");
    assert_eq!(
        TraceError::MissingAddress { line: 4 }.to_string(),
        "line 4: request has no address"
    );
}

#[test]
fn sim_error_wraps_config_error() {
    let err: SimError = ConfigError::ZeroAssociativity { cache: "L1".into() }.into();
    assert_eq!(
        err.to_string(),
        "invalid configuration: L1: associativity must be at least 1"
    );
    assert!(err.source().is_some());
}

#[test]
fn sim_error_wraps_trace_error() {
    let err: SimError = TraceError::UnknownOperation { op: 'q', line: 1 }.into();
    assert!(matches!(err, SimError::Trace(TraceError::UnknownOperation { .. })));
    assert_eq!(err.to_string(), "invalid trace: line 1: unknown request type 'q'");
}

#[test]
fn open_error_names_the_path() {
    let err = SimError::Open {
        path: PathBuf::from("traces/gcc.t"),
        source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
    };
    assert_eq!(err.to_string(), "unable to open file traces/gcc.t: no such file");
    assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("no such file"));
}

#[test]
fn trace_io_error_converts() {
    let err: TraceError = io::Error::other("disk gone").into();
    assert!(matches!(err, TraceError::Io(_)));
}
