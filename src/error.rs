//! Error types for probing and configuration.
//!
//! Probes never surface these through [`crate::ProbeStrategy::sample`]; they
//! are returned by the fallible readers underneath it and by config loading.

use std::io;
use std::path::PathBuf;

/// Failure of a single probe read.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("cannot read {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stat field {field} is not a number: {value:?}")]
    MalformedStat { field: usize, value: String },

    #[error("stat has only {fields} fields")]
    TruncatedStat { fields: usize },
}

impl ProbeError {
    /// True for conditions the kernel format contract rules out. These are
    /// worth surfacing, unlike a missing file.
    pub fn is_format_violation(&self) -> bool {
        !matches!(self, ProbeError::Unavailable { .. })
    }
}

/// Failure loading, validating or installing a [`crate::ProbeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("a probe was already selected for this process")]
    AlreadyPinned,
}
