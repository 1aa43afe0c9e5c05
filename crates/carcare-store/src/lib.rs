//! In-memory store for customer records
//!
//! Records keep insertion order, which drives both display and positional addressing.
//! Every record also gets a [`RecordId`] that stays stable when earlier records are
//! deleted.

use carcare_domain::CustomerRecord;
use carcare_types::{RecordId, StoreError};

/// Ordered collection of customer records
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    // Parallel vectors: ids[i] identifies records[i]
    ids: Vec<RecordId>,
    records: Vec<CustomerRecord>,
    next_id: u64,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already persisted records, keeping their order
    pub fn from_records(records: Vec<CustomerRecord>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.replace_all(records)?;
        Ok(store)
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }

    /// Append a record after validating it
    pub fn create(&mut self, record: CustomerRecord) -> Result<RecordId, StoreError> {
        record.validate()?;
        let id = self.allocate_id();
        self.ids.push(id);
        self.records.push(record);
        Ok(id)
    }

    /// Replace the record at `index`; it keeps its id
    pub fn update(&mut self, index: usize, record: CustomerRecord) -> Result<RecordId, StoreError> {
        self.check_index(index)?;
        record.validate()?;
        self.records[index] = record;
        Ok(self.ids[index])
    }

    /// Replace the record identified by `id`
    pub fn update_by_id(&mut self, id: RecordId, record: CustomerRecord) -> Result<usize, StoreError> {
        let index = self.position_of(id).ok_or(StoreError::NotFound(id))?;
        self.update(index, record)?;
        Ok(index)
    }

    /// Remove the record at `index`, shifting later records down by one
    pub fn delete(&mut self, index: usize) -> Result<(RecordId, CustomerRecord), StoreError> {
        self.check_index(index)?;
        let id = self.ids.remove(index);
        let record = self.records.remove(index);
        Ok((id, record))
    }

    /// Remove the record identified by `id`
    pub fn delete_by_id(&mut self, id: RecordId) -> Result<CustomerRecord, StoreError> {
        let index = self.position_of(id).ok_or(StoreError::NotFound(id))?;
        self.delete(index).map(|(_, record)| record)
    }

    /// Replace the whole collection. Fresh ids are assigned; old ids are not reused.
    ///
    /// Every record is validated first; if any fails the store is left unchanged.
    pub fn replace_all(&mut self, records: Vec<CustomerRecord>) -> Result<(), StoreError> {
        for record in &records {
            record.validate()?;
        }
        self.ids.clear();
        for _ in 0..records.len() {
            let id = self.allocate_id();
            self.ids.push(id);
        }
        self.records = records;
        Ok(())
    }

    /// All records in insertion order
    pub fn all(&self) -> &[CustomerRecord] {
        &self.records
    }

    /// Records paired with their position and id, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (usize, RecordId, &CustomerRecord)> {
        self.ids
            .iter()
            .zip(self.records.iter())
            .enumerate()
            .map(|(index, (id, record))| (index, *id, record))
    }

    pub fn get(&self, index: usize) -> Option<&CustomerRecord> {
        self.records.get(index)
    }

    pub fn get_by_id(&self, id: RecordId) -> Option<&CustomerRecord> {
        self.position_of(id).map(|index| &self.records[index])
    }

    pub fn id_at(&self, index: usize) -> Option<RecordId> {
        self.ids.get(index).copied()
    }

    /// Current position of a record
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
