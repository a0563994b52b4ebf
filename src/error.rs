use std::fmt;
use std::io;
use std::path::PathBuf;

/// Distinct reasons a scan can abort. Every kind is fatal for the whole file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanErrorKind {
    /// A line starts with something other than a letter, `#` or whitespace.
    InvalidParamStart,
    /// A character outside `[A-Za-z0-9_]` appeared inside a name.
    InvalidNameChar,
    NameTooLong,
    /// Whitespace after a name was followed by something other than `=`.
    MissingEquals,
    ValueTooLong,
    /// Non-space text after an unquoted value on the same line.
    TrailingGarbage,
}

impl ScanErrorKind {
    /// Stable code for log lines and scripts.
    pub fn code(self) -> &'static str {
        match self {
            ScanErrorKind::InvalidParamStart => "KVPS",
            ScanErrorKind::InvalidNameChar => "KVNC",
            ScanErrorKind::NameTooLong => "KVNL",
            ScanErrorKind::MissingEquals => "KVEQ",
            ScanErrorKind::ValueTooLong => "KVVL",
            ScanErrorKind::TrailingGarbage => "KVTG",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ScanErrorKind::InvalidParamStart => "param name can't start with this char",
            ScanErrorKind::InvalidNameChar => "wrong char in param name",
            ScanErrorKind::NameTooLong => "param name is too long",
            ScanErrorKind::MissingEquals => "expected '=' after param name",
            ScanErrorKind::ValueTooLong => "param value is too long",
            ScanErrorKind::TrailingGarbage => "unexpected char after value",
        }
    }
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A fatal syntax error with enough context to point a user at the offending spot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Error in {file}: {kind}{} on line {line}", DisplayByte(.byte))]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub file: String,
    pub line: usize,
    /// The byte that triggered the error.
    pub byte: Option<u8>,
}

struct DisplayByte<'a>(&'a Option<u8>);

impl fmt::Display for DisplayByte<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(b) if b.is_ascii() => write!(f, " {:?}", char::from(b)),
            Some(b) => write!(f, " '\\x{:02x}'", b),
            None => Ok(()),
        }
    }
}

/// Failures surfaced by the file-level helpers and the option table.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Can't read config file {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Syntax(#[from] ScanError),

    #[error("Unknown parameter \"{name}\"")]
    UnknownOption { name: String },

    #[error("Invalid value {value:?} for parameter \"{name}\": {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// The scan error kind, if this is a syntax failure.
    pub fn scan_kind(&self) -> Option<ScanErrorKind> {
        match self {
            ConfigError::Syntax(e) => Some(e.kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
