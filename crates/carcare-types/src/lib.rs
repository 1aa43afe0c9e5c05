//! Core types for carcare

mod error;

pub use error::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Stable identifier assigned to a record when it enters a store.
///
/// Ids are never reused within a session, so they survive deletes that shift positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_detection() {
        let err: Error = PersistError::Write {
            path: "customers.csv".to_string(),
            reason: "disk full".to_string(),
        }
        .into();
        assert!(err.is_write_failure());

        let err: Error = StoreError::Validation("name").into();
        assert!(!err.is_write_failure());
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Record index 3 is out of range (2 records)");
        assert_eq!(StoreError::NotFound(RecordId(7)).to_string(), "Record #7 not found");
    }
}
