//! Byte-level state machine for `name = value` config files.
//!
//! The scanner reads one byte at a time, never looks ahead and never
//! backtracks. An [`Entry`] is produced the moment its value is closed:
//!
//! ```text
//! # comment line (ignored)
//! name = value               # unquoted, ends at first space or '#'
//! name='single quoted, may hold # and spaces'
//! name="double quoted"
//! name=                       # empty value
//! ```
//!
//! Only ASCII bytes are classified; anything else is plain value text. Names
//! are ASCII by construction. A value is decoded as UTF-8 when it is valid
//! and as Latin-1 otherwise, so no byte is ever lost or rejected.
//!
//! Any syntax error aborts the whole scan, so callers either get every entry
//! of a file or none of them.

use std::collections::HashMap;
use std::mem;

use tracing::debug;

use crate::error::{ScanError, ScanErrorKind};

pub const DEFAULT_MAX_NAME_LENGTH: usize = 30;
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 255;

/// Option name to option value. Duplicate names keep the last value seen.
pub type ConfigMap = HashMap<String, String>;

/// Upper bounds on name and value length, counted in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_name_length: usize,
    pub max_value_length: usize,
}

impl Limits {
    pub fn with_max_name_length(mut self, len: usize) -> Self {
        self.max_name_length = len;
        self
    }

    pub fn with_max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Between entries or at the start of a line.
    SkipSpace,
    SkipComment,
    ParamName,
    SkipBeforeEqual,
    SkipAfterEqual,
    /// Unquoted value, ends at whitespace or `#`.
    Value,
    /// After an unquoted value; only whitespace or a comment may follow.
    LineEnd,
    ValueSingleQuoted,
    ValueDoubleQuoted,
}

/// One accepted `name = value` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub value: String,
    /// Line on which the value was closed.
    pub line: usize,
}

/// Push-style scanner. Feed it bytes in order, then call [`Scanner::finish`].
///
/// Each instance owns its name/value buffers, so scanning another file means
/// creating another `Scanner`.
#[derive(Debug)]
pub struct Scanner {
    file: String,
    limits: Limits,
    state: ScanState,
    name: String,
    value: Vec<u8>,
    line: usize,
}

impl Scanner {
    pub fn new(file: impl Into<String>, limits: Limits) -> Self {
        Self {
            file: file.into(),
            limits,
            state: ScanState::SkipSpace,
            name: String::new(),
            value: Vec::new(),
            line: 1,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Applies one transition. Returns the entry completed by `b`, if any.
    pub fn feed(&mut self, b: u8) -> Result<Option<Entry>, ScanError> {
        match self.state {
            ScanState::SkipSpace => {
                if b == b'#' {
                    self.state = ScanState::SkipComment;
                } else if b == b'\n' {
                    self.line += 1;
                } else if b.is_ascii_alphabetic() {
                    self.name.clear();
                    self.push_name(b)?;
                    self.state = ScanState::ParamName;
                } else if !is_space(b) {
                    return Err(self.fail(ScanErrorKind::InvalidParamStart, b));
                }
            }

            ScanState::SkipComment => {
                if b == b'\n' {
                    self.line += 1;
                    self.state = ScanState::SkipSpace;
                }
            }

            ScanState::ParamName => {
                if is_space(b) {
                    self.count_newline(b);
                    self.state = ScanState::SkipBeforeEqual;
                } else if b == b'=' {
                    self.state = ScanState::SkipAfterEqual;
                } else if is_name_byte(b) {
                    self.push_name(b)?;
                } else {
                    return Err(self.fail(ScanErrorKind::InvalidNameChar, b));
                }
            }

            ScanState::SkipBeforeEqual => {
                if is_space(b) {
                    self.count_newline(b);
                } else if b == b'=' {
                    self.state = ScanState::SkipAfterEqual;
                } else {
                    return Err(self.fail(ScanErrorKind::MissingEquals, b));
                }
            }

            ScanState::SkipAfterEqual => {
                if is_space(b) {
                    self.count_newline(b);
                    return Ok(None);
                }
                self.value.clear();
                match b {
                    b'\'' => self.state = ScanState::ValueSingleQuoted,
                    b'"' => self.state = ScanState::ValueDoubleQuoted,
                    b'#' => {
                        // `name=# ...` is an empty value followed by a comment
                        self.state = ScanState::SkipComment;
                        return Ok(Some(self.emit()));
                    }
                    _ => {
                        self.push_value(b)?;
                        self.state = ScanState::Value;
                    }
                }
            }

            ScanState::Value => {
                if is_space(b) || b == b'#' {
                    let entry = self.emit();
                    self.state = if b == b'#' {
                        ScanState::SkipComment
                    } else if b == b'\n' {
                        self.line += 1;
                        ScanState::SkipSpace
                    } else {
                        ScanState::LineEnd
                    };
                    return Ok(Some(entry));
                }
                self.push_value(b)?;
            }

            ScanState::LineEnd => {
                if b == b'\n' {
                    self.line += 1;
                    self.state = ScanState::SkipSpace;
                } else if b == b'#' {
                    self.state = ScanState::SkipComment;
                } else if !is_space(b) {
                    return Err(self.fail(ScanErrorKind::TrailingGarbage, b));
                }
            }

            ScanState::ValueSingleQuoted => return self.quoted(b, b'\''),
            ScanState::ValueDoubleQuoted => return self.quoted(b, b'"'),
        }
        Ok(None)
    }

    /// Ends the scan. An open value (quoted or not) is flushed; a name that
    /// never reached its value is dropped.
    pub fn finish(mut self) -> Option<Entry> {
        match self.state {
            ScanState::Value | ScanState::ValueSingleQuoted | ScanState::ValueDoubleQuoted => {
                Some(self.emit())
            }
            ScanState::ParamName | ScanState::SkipBeforeEqual | ScanState::SkipAfterEqual => {
                debug!(
                    file = %self.file,
                    line = self.line,
                    name = %self.name,
                    "input ended before a value for the param"
                );
                None
            }
            ScanState::SkipSpace | ScanState::SkipComment | ScanState::LineEnd => None,
        }
    }

    fn quoted(&mut self, b: u8, delimiter: u8) -> Result<Option<Entry>, ScanError> {
        if b == delimiter {
            self.state = ScanState::SkipSpace;
            return Ok(Some(self.emit()));
        }
        self.count_newline(b);
        self.push_value(b)?;
        Ok(None)
    }

    // Only ASCII letters, digits and '_' reach here, so byte length is char length.
    fn push_name(&mut self, b: u8) -> Result<(), ScanError> {
        if self.name.len() + 1 > self.limits.max_name_length {
            return Err(self.fail(ScanErrorKind::NameTooLong, b));
        }
        self.name.push(char::from(b));
        Ok(())
    }

    fn push_value(&mut self, b: u8) -> Result<(), ScanError> {
        if self.value.len() + 1 > self.limits.max_value_length {
            return Err(self.fail(ScanErrorKind::ValueTooLong, b));
        }
        self.value.push(b);
        Ok(())
    }

    fn count_newline(&mut self, b: u8) {
        if b == b'\n' {
            self.line += 1;
        }
    }

    fn emit(&mut self) -> Entry {
        Entry {
            name: mem::take(&mut self.name),
            value: decode_value(mem::take(&mut self.value)),
            line: self.line,
        }
    }

    fn fail(&self, kind: ScanErrorKind, b: u8) -> ScanError {
        ScanError {
            kind,
            file: self.file.clone(),
            line: self.line,
            byte: Some(b),
        }
    }
}

/// UTF-8 when valid, otherwise each byte maps to the Latin-1 code point of the
/// same value.
fn decode_value(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect())
}

/// The C `isspace` set: space, `\t`, `\n`, `\v`, `\f`, `\r`.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scans `source` and returns every entry in input order.
///
/// `file` only labels diagnostics. Errors are logged at `debug`; reporting
/// them to a user is left to the caller.
pub fn scan_entries(
    source: impl AsRef<[u8]>,
    file: &str,
    limits: &Limits,
) -> Result<Vec<Entry>, ScanError> {
    let mut scanner = Scanner::new(file, *limits);
    let mut entries = Vec::new();

    for &b in source.as_ref() {
        match scanner.feed(b) {
            Ok(Some(entry)) => {
                debug!(file, line = entry.line, name = %entry.name, "param accepted");
                entries.push(entry);
            }
            Ok(None) => {}
            Err(e) => {
                debug!(
                    file,
                    line = e.line,
                    byte = ?e.byte,
                    code = e.kind.code(),
                    "scan aborted: {}",
                    e
                );
                return Err(e);
            }
        }
    }

    entries.extend(scanner.finish());
    debug!(file, count = entries.len(), "scan complete");
    Ok(entries)
}

/// Scans `source` into a map. Later duplicates overwrite earlier ones.
pub fn scan(source: impl AsRef<[u8]>, file: &str, limits: &Limits) -> Result<ConfigMap, ScanError> {
    Ok(into_map(scan_entries(source, file, limits)?))
}

pub(crate) fn into_map(entries: Vec<Entry>) -> ConfigMap {
    entries.into_iter().map(|e| (e.name, e.value)).collect()
}
