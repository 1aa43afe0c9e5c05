//! Error types for carcare

use thiserror::Error;

use crate::RecordId;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Record store errors. None of these mutate the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required field (name, plate) is blank after trimming
    #[error("Required field is empty: {0}")]
    Validation(&'static str),

    #[error("Record index {index} is out of range ({len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Record {0} not found")]
    NotFound(RecordId),
}

/// Errors from the flat-file persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// File exists but could not be read or parsed
    #[error("Failed to read records from {path}: {reason}")]
    Read { path: String, reason: String },

    /// Save failed; the in-memory records are untouched
    #[error("Failed to save records to {path}: {reason}")]
    Write { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Persist(#[from] PersistError),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True when the error came from a failed save
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Error::Persist(PersistError::Write { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
