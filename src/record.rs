//! Per-symbol record types
//!
//! A [`StockRecord`] is produced once per symbol per run and is never
//! updated in place; re-harvesting a symbol replaces its checkpoint entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short ticker identifying a traded instrument (e.g. `PKN`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Wraps a ticker exactly as it appears on the page
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wraps a user-supplied ticker, uppercased to match listing tokens
    pub fn from_user_input(value: &str) -> Self {
        Self(value.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Up to ten yearly values of a metric, ordered per
/// [`SERIES_ORDER`](crate::extract::SERIES_ORDER)
pub type NumericSeries = Vec<i64>;

/// Single balance-sheet line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceItem {
    pub name: String,
    pub value: i64,
}

/// Balance-sheet line items keyed by name, in first-seen order
///
/// Inserting a name that already exists replaces its value but keeps its
/// position, so later rows with colliding names win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    items: Vec<BalanceItem>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a line item (last write wins)
    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        let name = name.into();
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(existing) => existing.value = value,
            None => self.items.push(BalanceItem { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalanceItem> {
        self.items.iter()
    }
}

/// Harvested snapshot of a single instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Display name (alternate ticker from the heading, or the symbol)
    pub name: String,
    pub symbol: Symbol,
    /// Date the snapshot was taken (UTC)
    pub date: NaiveDate,
    /// Current price
    pub price: f64,
    pub share_count: i64,
    pub market_cap: i64,
    /// Net profit for the last ten fiscal years (thousands)
    pub net_profit: NumericSeries,
    /// Revenue for the last ten fiscal years (thousands), when published
    pub revenue: Option<NumericSeries>,
    /// Price/earnings ratio, `None` when the page has no value
    pub price_earnings: Option<f64>,
    /// Number of years with a dividend payout among the last ten
    pub dividend_years: u8,
    /// Most recent value of each emphasized balance-sheet row
    pub balance_sheet: BalanceSheet,
}
