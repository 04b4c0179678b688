// File: crates/chart-overlays/src/error.rs
// Summary: Error types for lifecycle violations, persistence and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Lifecycle contract violation: a primitive was used before it was attached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("primitive `{primitive}` is not attached to a chart/series")]
    NotAttached { primitive: &'static str },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("persisted drawings are corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to serialize drawings: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognised color `{0}`")]
pub struct ColorParseError(pub String);
