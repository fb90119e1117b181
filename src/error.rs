//! Error types for reconscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Only setup failures are
//! errors: per-port network conditions are folded into
//! [`PortState`](crate::scanner::PortState) instead.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::types::{PortSpecError, ResolutionError};

/// Fatal errors raised before or while starting a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("invalid port specification: {0}")]
    InvalidPortSpec(#[from] PortSpecError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for configuration files")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Errors raised by the scan history store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save scan: {0}")]
    SaveFailed(String),

    #[error("failed to load scan: {0}")]
    LoadFailed(String),

    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan id prefix '{prefix}': {matches} matches")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
