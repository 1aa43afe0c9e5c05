//! Infrastructure layer - persistence implementations and load caching

pub mod cache;
pub mod persistence;

pub use cache::CachedRecordRepository;
pub use persistence::CsvRecordRepository;
