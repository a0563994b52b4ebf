//! Resolving scanned entries against the options an application expects.
//!
//! The scanner accepts any well-formed name. Deciding which names are known,
//! and what to use when one is missing, happens here after a successful scan.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::scanner::ConfigMap;

#[derive(Clone, Debug, Default)]
pub struct OptionTable {
    defaults: BTreeMap<String, Option<String>>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an option that falls back to `default` when absent.
    pub fn declare(mut self, name: &str, default: &str) -> Self {
        self.defaults
            .insert(name.to_string(), Some(default.to_string()));
        self
    }

    /// Declares an option with no fallback.
    pub fn declare_optional(mut self, name: &str) -> Self {
        self.defaults.insert(name.to_string(), None);
        self
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }

    /// Checks every scanned name against the table and fills in defaults.
    ///
    /// The first unknown name (in sorted order) fails the whole resolution.
    pub fn resolve(&self, config: &ConfigMap) -> Result<ResolvedOptions> {
        let mut names: Vec<_> = config.keys().collect();
        names.sort();
        if let Some(name) = names.into_iter().find(|n| !self.is_known(n)) {
            debug!(name = %name, "Unknown parameter");
            return Err(ConfigError::UnknownOption { name: name.clone() });
        }

        let values = self
            .defaults
            .iter()
            .filter_map(|(name, default)| {
                config
                    .get(name)
                    .or(default.as_ref())
                    .map(|v| (name.clone(), v.clone()))
            })
            .collect();
        Ok(ResolvedOptions { values })
    }
}

/// Known options with defaults applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, String>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `true` only for the literal `true`, like the server `SEND_LOG` switches.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(|s| s == "true").unwrap_or(false)
    }

    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.get(name) else {
            return Ok(None);
        };
        raw.parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
