//! Core error types for supermine-core.
//!
//! Two families live here. [`CoreError`] and its children cover construction,
//! configuration and storage plumbing and propagate with `?`. [`Rejection`]
//! is a user-visible refusal returned by engine commands: it is a value, not
//! a failure, and carries the guarantee that nothing was written.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::timer::CooldownKind;

/// Core error type for supermine-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Store cannot serve requests at all
    #[error("Store unavailable: {0}")]
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// A command the engine refused.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Insufficient balance: {required} coins required, {available} available")]
    InsufficientBalance { required: f64, available: f64 },

    #[error("At least {minimum} coins are required to convert, {available} available")]
    BelowConversionThreshold { minimum: f64, available: f64 },

    #[error("{kind} is cooling down for another {remaining_ms} ms")]
    CooldownActive {
        kind: CooldownKind,
        remaining_ms: u64,
    },

    #[error("Mining time is already at the {cap_ms} ms cap")]
    BoostCapReached { cap_ms: u64 },

    #[error("Hashrate is already at the {max} Gh/s maximum")]
    HashrateMaxed { max: u32 },

    #[error("Card {index} is already flipped")]
    CardAlreadyFlipped { index: usize },

    #[error("Card {index} does not exist (board has {len} cards)")]
    InvalidCard { index: usize, len: usize },

    #[error("Unknown boost package {index}")]
    UnknownPackage { index: usize },

    #[error("Reward action failed: {message}")]
    RewardFailed { message: String },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked
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

impl From<StorageError> for Rejection {
    fn from(err: StorageError) -> Self {
        Rejection::StorageUnavailable {
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
