//! Repository trait definitions for data persistence

use carcare_types::Error;

use crate::model::CustomerRecord;

/// Whole-collection persistence for customer records
///
/// Implementations always read and write the complete collection; there is no
/// partial update or append.
pub trait RecordRepository {
    /// Load every stored record in file order.
    ///
    /// A missing backing file is not an error and yields an empty list.
    fn load(&self) -> Result<Vec<CustomerRecord>, Error>;

    /// Replace the stored collection with `records`
    fn save(&self, records: &[CustomerRecord]) -> Result<(), Error>;

    /// Human-readable location of the backing storage
    fn location(&self) -> String;

    /// Move stored data that failed to load out of the way so the next save cannot
    /// overwrite it. Returns where it was moved, or `None` if nothing was stored.
    fn set_aside(&self) -> Result<Option<String>, Error> {
        Ok(None)
    }
}
