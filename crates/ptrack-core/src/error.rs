//! Core error types for ptrack-core.
//!
//! User-facing failures (form validation) and programming errors (stale
//! indices) are returned to the caller. Storage and notification failures
//! are logged at the point they happen and never reach the caller as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ptrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Key-value backend errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Backend refused the write (full, read-only, ...)
    #[error("Write rejected for key '{key}': {message}")]
    WriteRejected { key: String, message: String },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
///
/// The form variants render as the exact message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter an exercise name")]
    EmptyName,

    #[error("Target reps must be at least 1")]
    TargetRepsTooLow,

    #[error("Target sets must be at least 1")]
    TargetSetsTooLow,

    #[error("Hold time cannot be negative")]
    NegativeHoldTime,

    #[error("Target reps cannot be more than {0}")]
    TargetRepsTooHigh(i64),

    #[error("Target sets cannot be more than {0}")]
    TargetSetsTooHigh(i64),

    #[error("Hold time cannot be more than {0} seconds")]
    HoldTimeTooLong(i64),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Screen wake lock errors. Always logged, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WakeLockError {
    /// Platform has no wake lock facility
    #[error("Wake lock not supported")]
    Unsupported,

    /// Platform refused the request
    #[error("Wake lock request denied: {0}")]
    Denied(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
