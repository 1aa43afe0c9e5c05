//! Customer book: the session object the front end talks to
//!
//! Owns the record store and its repository. Every mutation is applied in memory first
//! and then the whole collection is saved; a failed save leaves the mutation in place
//! and is reported to the caller.

use std::cell::Cell;

use chrono::NaiveDate;
use serde::Serialize;

use carcare_domain::{
    record_matches, CustomerRecord, NextService, RecordFields, RecordRepository,
    RepairLedger,
};
use carcare_store::RecordStore;
use carcare_types::{Error, RecordId, Result};

/// Values collected for a new customer entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub model: String,
    pub service_date: NaiveDate,
    pub mileage: u64,
    /// Repair slots; blank items are ignored
    pub repairs: Vec<(String, u64)>,
    pub note: String,
}

/// Values submitted when editing an existing entry
///
/// The ledger is free text and the total is taken as given, even when it differs from
/// the ledger sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerEdit {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub model: String,
    pub service_date: NaiveDate,
    pub mileage: u64,
    pub repair_ledger: String,
    pub total_price: u64,
    pub note: String,
}

impl CustomerEdit {
    /// Edit form pre-filled with a record's current values
    pub fn from_record(record: &CustomerRecord) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            plate: record.plate.clone(),
            model: record.model.clone(),
            service_date: record.service_date(),
            mileage: record.mileage(),
            repair_ledger: record.repair_ledger.format(),
            total_price: record.total_price,
            note: record.note.clone(),
        }
    }
}

impl From<NewCustomer> for CustomerRecord {
    fn from(input: NewCustomer) -> Self {
        let repair_ledger = RepairLedger::from_slots(input.repairs);
        CustomerRecord::new(RecordFields {
            name: input.name,
            phone: input.phone,
            plate: input.plate,
            model: input.model,
            service_date: input.service_date,
            mileage: input.mileage,
            total_price: repair_ledger.total().unwrap_or(0),
            repair_ledger,
            note: input.note,
        })
    }
}

impl From<CustomerEdit> for CustomerRecord {
    fn from(input: CustomerEdit) -> Self {
        CustomerRecord::new(RecordFields {
            name: input.name,
            phone: input.phone,
            plate: input.plate,
            model: input.model,
            service_date: input.service_date,
            mileage: input.mileage,
            repair_ledger: RepairLedger::parse(&input.repair_ledger),
            total_price: input.total_price,
            note: input.note,
        })
    }
}

/// Result of a successful create or edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub id: RecordId,
    pub index: usize,
    pub next_service: NextService,
}

/// A search hit with its current position
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Match<'a> {
    pub index: usize,
    pub id: RecordId,
    pub record: &'a CustomerRecord,
}

/// Customer records of one session, backed by a repository
pub struct CustomerBook<R> {
    repo: R,
    store: RecordStore,
    // Stored data failed to load and has not been set aside yet
    unreadable: Cell<bool>,
}

impl<R: RecordRepository> CustomerBook<R> {
    /// Load the book from `repo`.
    ///
    /// If the stored data cannot be read the book starts empty and the read error is
    /// returned alongside it. The unreadable data is set aside before the first save.
    pub fn open(repo: R) -> (Self, Option<Error>) {
        let loaded = repo
            .load()
            .and_then(|records| RecordStore::from_records(records).map_err(Error::from));
        match loaded {
            Ok(store) => (
                Self {
                    repo,
                    store,
                    unreadable: Cell::new(false),
                },
                None,
            ),
            Err(e) => {
                log::warn!("Starting with an empty book: {}", e);
                (
                    Self {
                        repo,
                        store: RecordStore::new(),
                        unreadable: Cell::new(true),
                    },
                    Some(e),
                )
            }
        }
    }

    /// Add a customer entry
    pub fn create(&mut self, input: NewCustomer) -> Result<Applied> {
        let record = CustomerRecord::from(input);
        let next_service = record.next_service();
        let id = self.store.create(record)?;
        let index = self.store.len() - 1;
        log::info!("Created record {} at position {}", id, index);

        self.persist()?;
        Ok(Applied {
            id,
            index,
            next_service,
        })
    }

    /// Replace the entry at `index`
    pub fn edit(&mut self, index: usize, input: CustomerEdit) -> Result<Applied> {
        let record = Self::edited_record(input);
        let next_service = record.next_service();
        let id = self.store.update(index, record)?;
        log::info!("Updated record {} at position {}", id, index);

        self.persist()?;
        Ok(Applied {
            id,
            index,
            next_service,
        })
    }

    /// Replace the entry identified by `id`
    pub fn edit_by_id(&mut self, id: RecordId, input: CustomerEdit) -> Result<Applied> {
        let record = Self::edited_record(input);
        let next_service = record.next_service();
        let index = self.store.update_by_id(id, record)?;
        log::info!("Updated record {} at position {}", id, index);

        self.persist()?;
        Ok(Applied {
            id,
            index,
            next_service,
        })
    }

    fn edited_record(input: CustomerEdit) -> CustomerRecord {
        let record = CustomerRecord::from(input);
        if let Some(sum) = record.total_mismatch() {
            log::info!(
                "Total {} overrides ledger sum {} for {}",
                record.total_price,
                sum,
                record.plate
            );
        }
        record
    }

    /// Remove the entry at `index`; later entries move up one position
    pub fn delete(&mut self, index: usize) -> Result<CustomerRecord> {
        let (id, record) = self.store.delete(index)?;
        log::info!("Deleted record {} ({})", id, record.plate);

        self.persist()?;
        Ok(record)
    }

    /// Remove the entry identified by `id`
    pub fn delete_by_id(&mut self, id: RecordId) -> Result<CustomerRecord> {
        let record = self.store.delete_by_id(id)?;
        log::info!("Deleted record {} ({})", id, record.plate);

        self.persist()?;
        Ok(record)
    }

    /// Entries whose name, plate or repair ledger contain `keyword`, in book order
    pub fn search(&self, keyword: &str) -> Vec<Match<'_>> {
        self.store
            .entries()
            .filter(|(_, _, record)| record_matches(record, keyword))
            .map(|(index, id, record)| Match { index, id, record })
            .collect()
    }

    /// All entries in book order
    pub fn records(&self) -> &[CustomerRecord] {
        self.store.all()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Re-read the repository, replacing the in-memory entries.
    ///
    /// On failure the current entries are kept.
    pub fn reload(&mut self) -> Result<()> {
        let records = self.repo.load()?;
        self.store.replace_all(records)?;
        self.unreadable.set(false);
        Ok(())
    }

    /// Save the current entries, e.g. to retry after a failed save
    pub fn save(&self) -> Result<()> {
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if self.unreadable.get() {
            match self.repo.set_aside() {
                Ok(Some(moved_to)) => log::warn!("Unreadable data kept as {}", moved_to),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Changes kept in memory only: {}", e);
                    return Err(e);
                }
            }
            self.unreadable.set(false);
        }
        self.repo.save(self.store.all()).map_err(|e| {
            log::warn!("Changes kept in memory only: {}", e);
            e
        })
    }
}
