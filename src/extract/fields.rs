//! Field extractors for the detail, financial-analysis, balance-sheet and
//! dividends pages
//!
//! Each extractor returns an explicit `Option` (or a value with a documented
//! fallback); callers decide whether a missing field skips the symbol.

use crate::extract::markup::{closest, element_text, find_by_marker, value_after_marker};
use crate::extract::numbers::{last_ten_years, parse_decimal, parse_leading_integer, SERIES_YEARS};
use crate::record::{BalanceSheet, NumericSeries, Symbol};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Label preceding the share count; its absence marks a page without stock data
pub const SHARE_COUNT_MARKER: &str = "Liczba akcji:";
pub const MARKET_CAP_MARKER: &str = "Kapitalizacja:";
pub const PRICE_EARNINGS_MARKER: &str = "C/Z";

/// `data-field` of the net profit row on the financial-analysis page
pub const NET_PROFIT_FIELD: &str = "IncomeNetProfit";
/// `data-field` of the revenue row on the financial-analysis page
pub const REVENUE_FIELD: &str = "IncomeRevenues";

/// Header prefix of the dividends table layout that lists payouts
const PAYOUT_HEADER_PREFIX: &str = "wypłata";
const DIVIDEND_PLACEHOLDER: &str = "-";
/// Suffix appended to balance-sheet item names
const BALANCE_UNIT: &str = " (w tys.)";

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Notowania (\w+)(?: \((\w+)\))?").expect("Failed to compile heading regex")
});

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector"));
static PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".profile-h1-c .q_ch_act").expect("price selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("anchor selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));
static VALUE: Lazy<Selector> = Lazy::new(|| Selector::parse(".value").expect("value selector"));
static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("header selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector"));
static BOLD: Lazy<Selector> = Lazy::new(|| Selector::parse(".bold").expect("bold selector"));
static NEWEST: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".newest").expect("newest selector"));

/// Symbol and display name parsed from the page heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub symbol: Symbol,
    pub name: String,
}

/// Parses a heading such as `Notowania PKN (ORLEN)`
///
/// The name is the parenthesised alternate token when present, otherwise the
/// symbol itself.
pub fn parse_heading(text: &str) -> Option<Heading> {
    let captures = HEADING_RE.captures(text.trim())?;
    let symbol = captures.get(1)?.as_str();
    let name = captures
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or(symbol)
        .to_string();

    Some(Heading {
        symbol: Symbol::new(symbol),
        name,
    })
}

/// Heading of the detail page
pub fn heading(document: &Html) -> Option<Heading> {
    let h1 = document.select(&H1).next()?;
    parse_heading(&element_text(&h1))
}

/// Current price shown in the profile header
pub fn current_price(document: &Html) -> Option<f64> {
    let element = document.select(&PRICE).next()?;
    parse_decimal(&element_text(&element))
}

/// Number of shares, read from the link next to the share-count label
///
/// Falls back to the whole value cell when it holds no link.
pub fn share_count(document: &Html) -> Option<i64> {
    let cell = value_after_marker(document, SHARE_COUNT_MARKER)?;
    let text = match cell.select(&ANCHOR).next() {
        Some(link) => element_text(&link),
        None => element_text(&cell),
    };
    Some(parse_leading_integer(&text))
}

/// Market capitalization next to its label
pub fn market_cap(document: &Html) -> Option<i64> {
    let cell = value_after_marker(document, MARKET_CAP_MARKER)?;
    Some(parse_leading_integer(&element_text(&cell)))
}

/// Price/earnings ratio from the row labelled [`PRICE_EARNINGS_MARKER`]
///
/// `None` means the page has no such row or value, which is distinct from a
/// ratio of zero.
pub fn price_earnings_ratio(document: &Html) -> Option<f64> {
    let marker = find_by_marker(document, PRICE_EARNINGS_MARKER)?;
    let row = closest(marker, "tr")?;
    let value = row.select(&VALUE).next()?;
    parse_decimal(&element_text(&value))
}

/// Ten-year series from the row with the given `data-field`
pub fn yearly_series(document: &Html, field: &str) -> Option<NumericSeries> {
    let selector = Selector::parse(&format!("tr[data-field=\"{}\"]", field)).ok()?;
    let row = document.select(&selector).next()?;
    let cells: Vec<String> = row.select(&CELL).map(|cell| element_text(&cell)).collect();
    Some(last_ten_years(&cells))
}

/// Number of the last ten years with a dividend payout
///
/// The site renders two table layouts. When the first header starts with
/// the payout prefix, up to ten data rows are inspected and every third
/// column that is not a placeholder dash counts. Any other layout reports 0.
/// Returns `None` only when the page has no table at all.
pub fn dividend_years_count(document: &Html) -> Option<u8> {
    let table = document.select(&TABLE).next()?;

    let header = table
        .select(&HEADER)
        .next()
        .map(|th| element_text(&th))
        .unwrap_or_default();

    if !header.starts_with(PAYOUT_HEADER_PREFIX) {
        return Some(0);
    }

    let paid = table
        .select(&ROW)
        .skip(1)
        .take(SERIES_YEARS)
        .filter_map(|row| row.select(&CELL).nth(2))
        .filter(|cell| element_text(cell) != DIVIDEND_PLACEHOLDER)
        .count();

    Some(paid as u8)
}

/// Most recent value of every emphasized balance-sheet row
///
/// The item name is the first cell suffixed with the unit; the value comes
/// from the cell marked newest. Rows with colliding names overwrite earlier
/// ones on purpose, matching how the site repeats subtotal labels.
pub fn balance_sheet_latest(document: &Html) -> BalanceSheet {
    let mut sheet = BalanceSheet::new();

    for row in document.select(&BOLD) {
        let Some(name_cell) = row.select(&CELL).next() else {
            continue;
        };
        let Some(newest) = row.select(&NEWEST).next() else {
            continue;
        };

        let name = format!("{}{}", element_text(&name_cell), BALANCE_UNIT);
        sheet.insert(name, parse_leading_integer(&element_text(&newest)));
    }

    sheet
}
