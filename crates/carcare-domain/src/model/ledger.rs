//! Repair ledger: the billed work of one service visit
//!
//! Text form is `"<item> ($<price>), <item> ($<price>)"`. Text that does not follow the
//! convention is kept verbatim instead of being rejected, since the ledger is free-form
//! user input on the edit path.

use std::fmt;

use serde::{Deserialize, Serialize};

const ENTRY_SEPARATOR: &str = ", ";
const PRICE_OPEN: &str = " ($";
const PRICE_CLOSE: char = ')';

/// One billed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairItem {
    pub item: String,
    pub price: u64,
}

impl RepairItem {
    pub fn new(item: impl Into<String>, price: u64) -> Self {
        Self {
            item: item.into(),
            price,
        }
    }
}

impl fmt::Display for RepairItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.item, PRICE_OPEN, self.price, PRICE_CLOSE)
    }
}

/// Ordered repair lines, or unparsed ledger text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepairLedger {
    Items(Vec<RepairItem>),
    /// Text that did not follow the item/price convention
    Text(String),
}

impl Default for RepairLedger {
    fn default() -> Self {
        RepairLedger::Items(Vec::new())
    }
}

impl RepairLedger {
    /// Build a ledger from entry slots.
    ///
    /// Slots whose item is blank are dropped; item names are trimmed.
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let items = slots
            .into_iter()
            .filter_map(|(item, price)| {
                let item = item.as_ref().trim();
                if item.is_empty() {
                    None
                } else {
                    Some(RepairItem::new(item, price))
                }
            })
            .collect();
        RepairLedger::Items(items)
    }

    /// Parse ledger text, keeping it verbatim when it does not follow the convention
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return RepairLedger::default();
        }
        match parse_items(text) {
            Some(items) => RepairLedger::Items(items),
            None => RepairLedger::Text(text.to_string()),
        }
    }

    /// Text form of the ledger
    pub fn format(&self) -> String {
        match self {
            RepairLedger::Items(items) => items
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(ENTRY_SEPARATOR),
            RepairLedger::Text(text) => text.clone(),
        }
    }

    /// Structured lines, if the ledger was parsed
    pub fn items(&self) -> Option<&[RepairItem]> {
        match self {
            RepairLedger::Items(items) => Some(items),
            RepairLedger::Text(_) => None,
        }
    }

    /// Sum of line prices; `None` for unparsed text
    pub fn total(&self) -> Option<u64> {
        self.items()
            .map(|items| items.iter().fold(0u64, |acc, i| acc.saturating_add(i.price)))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RepairLedger::Items(items) => items.is_empty(),
            RepairLedger::Text(text) => text.is_empty(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RepairLedger::Text(_))
    }
}

impl fmt::Display for RepairLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<String> for RepairLedger {
    fn from(text: String) -> Self {
        RepairLedger::parse(&text)
    }
}

impl From<RepairLedger> for String {
    fn from(ledger: RepairLedger) -> Self {
        ledger.format()
    }
}

fn parse_items(text: &str) -> Option<Vec<RepairItem>> {
    let mut items = Vec::new();
    let mut rest = text;
    loop {
        let (item, remainder) = split_entry(rest)?;
        items.push(item);
        if remainder.is_empty() {
            return Some(items);
        }
        rest = &remainder[ENTRY_SEPARATOR.len()..];
    }
}

/// Split the first `<item> ($<price>)` entry off `text`.
///
/// The returned remainder is either empty or starts with the entry separator, so item
/// names may themselves contain `" ($"` or `", "`.
fn split_entry(text: &str) -> Option<(RepairItem, &str)> {
    for (pos, _) in text.match_indices(PRICE_OPEN) {
        let after = &text[pos + PRICE_OPEN.len()..];
        let digits = after.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            continue;
        }
        let Some(remainder) = after[digits..].strip_prefix(PRICE_CLOSE) else {
            continue;
        };
        if !remainder.is_empty() && !remainder.starts_with(ENTRY_SEPARATOR) {
            continue;
        }

        // Names are trimmed like structured slots, so "a ($1),  b ($2)" yields "b"
        let item = text[..pos].trim();
        if item.is_empty() {
            return None;
        }
        let price = after[..digits].parse().ok()?;
        return Some((RepairItem::new(item, price), remainder));
    }
    None
}
