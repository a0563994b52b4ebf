use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::scanner::{into_map, scan_entries, ConfigMap, Entry, Limits};

// Config loading returns errors instead of panicking so each binary decides
// whether a bad file is fatal. The file handle never outlives this call.
pub fn load_entries(path: impl AsRef<Path>, limits: &Limits) -> Result<Vec<Entry>> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|source| unavailable(path, source))?;
    debug!(file = %path.display(), bytes = content.len(), "config file read");
    Ok(scan_entries(&content, &path.display().to_string(), limits)?)
}

/// Reads and scans the file at `path`. Either every entry is returned or none.
pub fn load_config(path: impl AsRef<Path>, limits: &Limits) -> Result<ConfigMap> {
    Ok(into_map(load_entries(path, limits)?))
}

/// Same as [`load_config`] for an already open source. `name` labels diagnostics.
pub fn read_config<R: Read>(mut reader: R, name: &str, limits: &Limits) -> Result<ConfigMap> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|source| unavailable(Path::new(name), source))?;
    debug!(file = name, bytes = content.len(), "config source read");
    Ok(into_map(scan_entries(&content, name, limits)?))
}

fn unavailable(path: &Path, source: io::Error) -> ConfigError {
    debug!(file = %path.display(), "can't read config source: {}", source);
    ConfigError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    }
}
