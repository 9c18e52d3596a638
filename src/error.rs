//! Error types shared across the crate.

use thiserror::Error;

use crate::stream::Lifecycle;

/// Failure of a single data-source read. Always transient from the stream's
/// point of view: the next tick is the retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("scan is not running")]
    NotScanning,
    #[error("hardware buffer overrun ({lost} samples lost)")]
    Overrun { lost: usize },
    #[error("device disconnected")]
    Disconnected,
    #[error("device read failed: {0}")]
    Device(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error("cannot {operation} while stream is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: Lifecycle,
    },
    #[error("stream capacity must be non-zero")]
    ZeroCapacity,
    #[error("failed to start scan: {0}")]
    ScanStart(SourceError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
