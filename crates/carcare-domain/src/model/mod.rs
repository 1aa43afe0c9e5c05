//! Domain model types

pub mod ledger;
pub mod record;

pub use ledger::{RepairItem, RepairLedger};
pub use record::{CustomerRecord, RecordFields};
