//! Persistence implementations
//!
//! This module provides file-based implementations of the repository traits.

mod csv_record_repo;

pub use csv_record_repo::{CsvRecordRepository, COLUMNS, LEGACY_COLUMNS};
