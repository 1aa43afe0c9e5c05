//! Keyword search over customer records

use crate::model::CustomerRecord;

/// Case-insensitive substring match against name, plate or ledger text.
///
/// A blank keyword matches every record. Any other keyword is matched as given,
/// surrounding whitespace included.
pub fn record_matches(record: &CustomerRecord, keyword: &str) -> bool {
    if keyword.trim().is_empty() {
        return true;
    }
    let needle = keyword.to_lowercase();
    contains_folded(&record.name, &needle)
        || contains_folded(&record.plate, &needle)
        || contains_folded(&record.repair_ledger.format(), &needle)
}

/// Records matching `keyword`, in their original order
pub fn filter_records<'a, I>(records: I, keyword: &str) -> Vec<&'a CustomerRecord>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    records
        .into_iter()
        .filter(|r| record_matches(r, keyword))
        .collect()
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
