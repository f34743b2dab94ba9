//! TOML configuration file for the `dewrap` binary
//!
//! Every key is optional; command-line flags override file values.
//!
//! ```toml
//! pointer = "/state"
//! only = ["ref", "reactive"]
//! threads = 4
//! pretty = true
//! skip_invalid = false
//!
//! [limits]
//! max_document_bytes = 16777216
//! max_records = 100000
//! ```

use dewrap_io::{Limits, WrapperKind};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Values read from `--config`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub pointer: Option<String>,
    pub only: Option<Vec<String>>,
    pub threads: Option<usize>,
    pub pretty: Option<bool>,
    pub skip_invalid: Option<bool>,
    pub limits: LimitsConfig,
}

/// Overrides for [`Limits`]
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_document_bytes: Option<usize>,
    pub max_records: Option<usize>,
    pub max_pointer_length: Option<usize>,
    pub max_pointer_depth: Option<usize>,
}

impl CliConfig {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e).into())
    }

    /// Parse config text
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Wrapper kinds named by `only`, if set
    pub fn only_kinds(&self) -> Result<Option<Vec<WrapperKind>>, String> {
        self.only
            .as_ref()
            .map(|names| names.iter().map(|name| name.parse()).collect())
            .transpose()
    }

    /// Default limits with the file's overrides applied
    pub fn limits(&self) -> Limits {
        let defaults = Limits::default();
        Limits {
            max_document_bytes: self
                .limits
                .max_document_bytes
                .unwrap_or(defaults.max_document_bytes),
            max_records: self.limits.max_records.unwrap_or(defaults.max_records),
            max_pointer_length: self
                .limits
                .max_pointer_length
                .unwrap_or(defaults.max_pointer_length),
            max_pointer_depth: self
                .limits
                .max_pointer_depth
                .unwrap_or(defaults.max_pointer_depth),
        }
    }
}
