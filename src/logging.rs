use std::str::FromStr;

use tracing::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unrecognised names fall back to `Info`.
    pub fn parse_lenient(level: &str) -> Self {
        level.parse().unwrap_or_default()
    }

    pub fn as_tracing(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.trim().to_uppercase().as_str() {
            "DEBUG" | "DEBG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" | "ERRO" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

/// Installs the global fmt subscriber. Diagnostics go to stderr so stdout
/// stays clean for scanned output.
pub fn init(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_names_and_short_codes() {
        assert_eq!("debug".parse(), Ok(LogLevel::Debug));
        assert_eq!("ERRO".parse(), Ok(LogLevel::Error));
        assert_eq!(" warn ".parse(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn lenient_parse_defaults_to_info() {
        assert_eq!(LogLevel::parse_lenient("chatty"), LogLevel::Info);
        assert_eq!(LogLevel::parse_lenient("DEBUG"), LogLevel::Debug);
    }

    #[test]
    fn maps_to_tracing_levels() {
        assert_eq!(LogLevel::Warn.as_tracing(), Level::WARN);
        assert_eq!(LogLevel::default().as_tracing(), Level::INFO);
    }
}
