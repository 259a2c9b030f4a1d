//! Trace Reader.
//!
//! Streams `(operation, address)` records out of a text trace. A record is one
//! operation character (`r`/`R` read, `w`/`W` write) followed by a hexadecimal address
//! of at most 32 bits, with an optional `0x` prefix. Whitespace, newlines included, is
//! insignificant between and around records, and the address may follow the operation
//! character directly (`r1f`).
//!
//! Every malformed record is fatal; the reader yields the error and then stops.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::common::{AccessType, SimError, TraceError};

/// One trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Read or write.
    pub op: AccessType,
    /// Byte address.
    pub addr: u32,
}

impl TraceRecord {
    /// Creates a record.
    pub const fn new(op: AccessType, addr: u32) -> Self {
        Self { op, addr }
    }
}

/// Streaming parser over any buffered reader.
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line: usize,
    buf: String,
    tokens: VecDeque<String>,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps `reader`.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
            tokens: VecDeque::new(),
            done: false,
        }
    }

    /// Line number of the most recently read line (1-based, 0 before any read).
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Next whitespace-separated token, reading further lines as needed.
    fn next_token(&mut self) -> Result<Option<String>, TraceError> {
        while self.tokens.is_empty() {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.tokens
                .extend(self.buf.split_whitespace().map(str::to_owned));
        }
        Ok(self.tokens.pop_front())
    }

    fn next_record(&mut self) -> Result<Option<TraceRecord>, TraceError> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };
        let op_line = self.line;

        let mut chars = token.chars();
        let Some(op_char) = chars.next() else {
            return Ok(None);
        };
        let op = AccessType::from_char(op_char).ok_or(TraceError::UnknownOperation {
            op: op_char,
            line: op_line,
        })?;

        let rest = chars.as_str();
        let addr_token = if rest.is_empty() {
            self.next_token()?
                .ok_or(TraceError::MissingAddress { line: op_line })?
        } else {
            rest.to_owned()
        };

        let addr = parse_address(&addr_token).ok_or_else(|| TraceError::InvalidAddress {
            token: addr_token.clone(),
            line: self.line,
        })?;
        Ok(Some(TraceRecord::new(op, addr)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Parses a hexadecimal address with an optional `0x`/`0X` prefix.
pub fn parse_address(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Parses a complete in-memory trace.
///
/// # Errors
///
/// Returns the first [`TraceError`] encountered.
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>, TraceError> {
    TraceReader::new(text.as_bytes()).collect()
}
