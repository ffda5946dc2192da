//! Numeric coercion of cell text
//!
//! Every function here is total: malformed or empty input yields a defined
//! fallback instead of an error.

use crate::record::NumericSeries;

/// Chronological direction of a [`NumericSeries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrder {
    NewestFirst,
    OldestFirst,
}

/// Direction of every series produced by [`last_ten_years`]
///
/// Source tables list fiscal years oldest to newest.
pub const SERIES_ORDER: SeriesOrder = SeriesOrder::NewestFirst;

/// Maximum number of yearly values kept in a series
pub const SERIES_YEARS: usize = 10;

/// Parses the integer at the start of `text`
///
/// Accepts an optional leading minus followed by digits; spaces (including
/// non-breaking spaces) between digits are thousands separators. Scanning
/// stops at the first other character. Returns 0 when no digit is found or
/// the value does not fit in an `i64`.
///
/// # Example
///
/// ```
/// use radar_harvest::extract::parse_leading_integer;
///
/// assert_eq!(parse_leading_integer("1 234 567"), 1_234_567);
/// assert_eq!(parse_leading_integer("-12"), -12);
/// assert_eq!(parse_leading_integer(""), 0);
/// ```
pub fn parse_leading_integer(text: &str) -> i64 {
    let mut chars = text.trim_start().chars().peekable();

    let mut digits = String::new();
    if chars.peek() == Some(&'-') {
        digits.push('-');
        chars.next();
    }

    for c in chars {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '\u{a0}' => continue,
            _ => break,
        }
    }

    digits.parse::<i64>().unwrap_or(0)
}

/// Parses a decimal value such as `"12.34"`, `"1 234,5"` or `"-0.7"`
///
/// Returns `None` for empty or non-numeric text.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extracts the last ten fiscal years from a table row
///
/// `cells` are the texts of every cell in the row; the first (row header)
/// and the last (spacer) are not data. The window ends one before the final
/// cell and holds at most [`SERIES_YEARS`] cells, so rows with a shorter
/// history yield a shorter series. Each cell goes through
/// [`parse_leading_integer`] and the result is ordered per [`SERIES_ORDER`].
pub fn last_ten_years<S: AsRef<str>>(cells: &[S]) -> NumericSeries {
    if cells.len() < 3 {
        return Vec::new();
    }

    let interior = cells.len() - 2;
    let start = interior.saturating_sub(SERIES_YEARS - 1).max(1);
    let end = cells.len() - 1;

    let window = cells[start..end]
        .iter()
        .map(|cell| parse_leading_integer(cell.as_ref()));

    match SERIES_ORDER {
        SeriesOrder::NewestFirst => window.rev().collect(),
        SeriesOrder::OldestFirst => window.collect(),
    }
}
