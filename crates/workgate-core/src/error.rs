//! Core error types for workgate-core.
//!
//! Nothing in the tick path returns these: persistence failures during a
//! running session are logged and swallowed by the clock adapter. They are
//! used for opening stores, loading configuration, and refused transitions.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for workgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Clock store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A session operation was refused in the current gate state
    #[error("Transition refused: {0}")]
    Transition(#[from] TransitionError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Clock store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open clock store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Clock store is locked")]
    Locked,

    /// Store refused the write (quota, read-only medium, ...)
    #[error("Clock store unavailable: {0}")]
    Unavailable(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not resolve the data directory
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

/// Operations refused by the session gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Stop is only reachable once the target has been reached
    #[error("timer cannot be stopped before the target is reached")]
    StopWhileLocked,

    /// Stop needs a ticking timer
    #[error("timer is not running")]
    NotRunning,

    /// The session is over
    #[error("session already stopped at {recorded_secs}s")]
    AlreadyStopped { recorded_secs: u64 },

    /// Submitting requires the gate to be unlocked
    #[error("submission is locked until the target is reached")]
    SubmissionLocked,

    /// A submission is already in flight
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Work draft is missing a required field
    #[error("Title, body, and at least one photo are required")]
    IncompleteDraft { missing: Vec<&'static str> },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}
