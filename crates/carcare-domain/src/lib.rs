//! Domain layer: customer records, the service schedule, search and the persistence seam

pub mod model;
pub mod repository;
pub mod service;

pub use model::{CustomerRecord, RecordFields, RepairItem, RepairLedger};
pub use repository::RecordRepository;
pub use service::{compute_next, filter_records, record_matches, NextService};
