//! Domain services

pub mod schedule;
pub mod search;

pub use schedule::{compute_next, NextService, SERVICE_INTERVAL_MILEAGE, SERVICE_INTERVAL_MONTHS};
pub use search::{filter_records, record_matches};
