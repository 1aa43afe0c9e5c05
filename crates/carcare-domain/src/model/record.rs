//! Customer record: contact, vehicle and the latest service visit

use chrono::NaiveDate;
use serde::Serialize;

use carcare_types::StoreError;

use crate::model::RepairLedger;
use crate::service::schedule::{compute_next, NextService};

/// Caller-supplied record values, everything except the derived next-service fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub model: String,
    pub service_date: NaiveDate,
    pub mileage: u64,
    pub repair_ledger: RepairLedger,
    pub total_price: u64,
    pub note: String,
}

/// A customer/vehicle/service entry
///
/// The next service date and mileage are always computed from the service date and
/// mileage; there is no way to set them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub model: String,
    service_date: NaiveDate,
    mileage: u64,
    next_service_date: NaiveDate,
    next_mileage: u64,
    pub repair_ledger: RepairLedger,
    pub total_price: u64,
    pub note: String,
}

impl CustomerRecord {
    /// Build a record, trimming text fields and deriving the next service
    pub fn new(fields: RecordFields) -> Self {
        let next = compute_next(fields.service_date, fields.mileage);
        Self {
            name: fields.name.trim().to_string(),
            phone: fields.phone.trim().to_string(),
            plate: fields.plate.trim().to_string(),
            model: fields.model.trim().to_string(),
            service_date: fields.service_date,
            mileage: fields.mileage,
            next_service_date: next.date,
            next_mileage: next.mileage,
            repair_ledger: fields.repair_ledger,
            total_price: fields.total_price,
            note: fields.note.trim().to_string(),
        }
    }

    /// Record a new service visit, recomputing the next service
    pub fn reschedule(&mut self, service_date: NaiveDate, mileage: u64) {
        let next = compute_next(service_date, mileage);
        self.service_date = service_date;
        self.mileage = mileage;
        self.next_service_date = next.date;
        self.next_mileage = next.mileage;
    }

    /// Check the fields a record needs before it can be stored
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name"));
        }
        if self.plate.trim().is_empty() {
            return Err(StoreError::Validation("plate"));
        }
        Ok(())
    }

    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn mileage(&self) -> u64 {
        self.mileage
    }

    pub fn next_service_date(&self) -> NaiveDate {
        self.next_service_date
    }

    pub fn next_mileage(&self) -> u64 {
        self.next_mileage
    }

    pub fn next_service(&self) -> NextService {
        NextService {
            date: self.next_service_date,
            mileage: self.next_mileage,
        }
    }

    /// Ledger total when it differs from the billed total
    pub fn total_mismatch(&self) -> Option<u64> {
        self.repair_ledger
            .total()
            .filter(|&sum| sum != self.total_price)
    }
}
