//! Repository adapters for persistence layer

use std::path::PathBuf;
use std::time::Duration;

use carcare_infra::{CachedRecordRepository, CsvRecordRepository};
use carcare_types::{Error, Result};

use crate::book::CustomerBook;
use crate::config::Config;

/// Repository stack used by the application: CSV file behind a load cache
pub type FileRepository = CachedRecordRepository<CsvRecordRepository>;

/// Open the configured customer data file
pub fn open_record_repo(config: &Config) -> Result<FileRepository> {
    Ok(open_record_repo_at(config.data_file()?, config.cache_ttl()))
}

/// Open a customer data file at a custom path
pub fn open_record_repo_at(csv_path: PathBuf, ttl: Duration) -> FileRepository {
    CachedRecordRepository::new(CsvRecordRepository::new(csv_path), ttl)
}

/// Open the customer book for the configured data file.
///
/// A data file that cannot be read yields an empty book plus the read error.
pub fn open_book(config: &Config) -> Result<(CustomerBook<FileRepository>, Option<Error>)> {
    let repo = open_record_repo(config)?;
    Ok(CustomerBook::open(repo))
}
