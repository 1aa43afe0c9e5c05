//! Load cache for record repositories
//!
//! Display refreshes may reload the collection often; within the freshness window the
//! last load is served from memory. Saving always drops the cached copy.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use carcare_domain::{CustomerRecord, RecordRepository};
use carcare_types::Error;

/// Default freshness window for cached loads
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CachedLoad {
    loaded_at: Instant,
    records: Vec<CustomerRecord>,
}

/// Repository wrapper that caches successful loads for a bounded time
pub struct CachedRecordRepository<R> {
    inner: R,
    ttl: Duration,
    cached: RefCell<Option<CachedLoad>>,
}

impl<R: RecordRepository> CachedRecordRepository<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RefCell::new(None),
        }
    }

    pub fn with_default_ttl(inner: R) -> Self {
        Self::new(inner, DEFAULT_TTL)
    }

    /// Drop the cached load so the next `load` reads the backing storage
    pub fn invalidate(&self) {
        self.cached.borrow_mut().take();
    }

    /// True when a load inside the freshness window is cached
    pub fn is_fresh(&self) -> bool {
        self.cached
            .borrow()
            .as_ref()
            .map(|c| c.loaded_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: RecordRepository> RecordRepository for CachedRecordRepository<R> {
    fn load(&self) -> Result<Vec<CustomerRecord>, Error> {
        if self.is_fresh() {
            if let Some(cached) = self.cached.borrow().as_ref() {
                log::debug!("Serving {} records from load cache", cached.records.len());
                return Ok(cached.records.clone());
            }
        }

        let records = self.inner.load()?;
        *self.cached.borrow_mut() = Some(CachedLoad {
            loaded_at: Instant::now(),
            records: records.clone(),
        });
        Ok(records)
    }

    fn save(&self, records: &[CustomerRecord]) -> Result<(), Error> {
        self.invalidate();
        self.inner.save(records)
    }

    fn location(&self) -> String {
        self.inner.location()
    }

    fn set_aside(&self) -> Result<Option<String>, Error> {
        self.invalidate();
        self.inner.set_aside()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carcare_domain::{RecordFields, RepairLedger};
    use carcare_types::PersistError;
    use chrono::NaiveDate;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingRepository {
        records: RefCell<Vec<CustomerRecord>>,
        loads: Cell<usize>,
        fail_load: Cell<bool>,
    }

    impl RecordRepository for CountingRepository {
        fn load(&self) -> Result<Vec<CustomerRecord>, Error> {
            self.loads.set(self.loads.get() + 1);
            if self.fail_load.get() {
                return Err(PersistError::Read {
                    path: self.location(),
                    reason: "corrupt".to_string(),
                }
                .into());
            }
            Ok(self.records.borrow().clone())
        }

        fn save(&self, records: &[CustomerRecord]) -> Result<(), Error> {
            *self.records.borrow_mut() = records.to_vec();
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    fn record(name: &str) -> CustomerRecord {
        CustomerRecord::new(RecordFields {
            name: name.to_string(),
            phone: String::new(),
            plate: "ABC-123".to_string(),
            model: String::new(),
            service_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            mileage: 0,
            repair_ledger: RepairLedger::default(),
            total_price: 0,
            note: String::new(),
        })
    }

    #[test]
    fn test_fresh_load_is_cached() {
        let repo = CachedRecordRepository::with_default_ttl(CountingRepository::default());
        repo.load().unwrap();
        repo.load().unwrap();
        assert_eq!(repo.inner().loads.get(), 1);
        assert!(repo.is_fresh());
    }

    #[test]
    fn test_zero_ttl_always_reloads() {
        let repo = CachedRecordRepository::new(CountingRepository::default(), Duration::ZERO);
        repo.load().unwrap();
        repo.load().unwrap();
        assert_eq!(repo.inner().loads.get(), 2);
    }

    #[test]
    fn test_save_invalidates() {
        let repo = CachedRecordRepository::with_default_ttl(CountingRepository::default());
        assert!(repo.load().unwrap().is_empty());

        repo.save(&[record("王小明")]).unwrap();
        assert!(!repo.is_fresh());

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(repo.inner().loads.get(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let repo = CachedRecordRepository::with_default_ttl(CountingRepository::default());
        repo.inner().fail_load.set(true);
        assert!(repo.load().is_err());
        assert!(!repo.is_fresh());

        repo.inner().fail_load.set(false);
        assert!(repo.load().is_ok());
        assert_eq!(repo.inner().loads.get(), 2);
    }

    #[test]
    fn test_set_aside_invalidates() {
        let repo = CachedRecordRepository::with_default_ttl(CountingRepository::default());
        repo.load().unwrap();
        assert_eq!(repo.set_aside().unwrap(), None);
        assert!(!repo.is_fresh());
    }

    #[test]
    fn test_explicit_invalidate() {
        let repo = CachedRecordRepository::with_default_ttl(CountingRepository::default());
        repo.load().unwrap();
        repo.invalidate();
        repo.load().unwrap();
        assert_eq!(repo.inner().loads.get(), 2);
    }
}
