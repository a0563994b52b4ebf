pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod scanner;

pub use config::{load_config, load_entries, read_config};
pub use error::{ConfigError, ScanError, ScanErrorKind};
pub use options::{OptionTable, ResolvedOptions};
pub use scanner::{scan, scan_entries, ConfigMap, Entry, Limits, ScanState, Scanner};
