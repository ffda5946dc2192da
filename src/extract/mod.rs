//! Field extraction from loosely structured markup
//!
//! Pure functions turning parsed pages into typed values:
//! - numeric coercion and ten-year windowing (`numbers`)
//! - per-field extractors with explicit absence (`fields`)
//! - marker-text traversal shared with link discovery (`markup`)

pub mod fields;
pub mod markup;
mod numbers;

pub use fields::{
    balance_sheet_latest, current_price, dividend_years_count, heading, market_cap,
    parse_heading, price_earnings_ratio, share_count, yearly_series, Heading,
    NET_PROFIT_FIELD, REVENUE_FIELD, SHARE_COUNT_MARKER,
};
pub use numbers::{
    last_ten_years, parse_decimal, parse_leading_integer, SeriesOrder, SERIES_ORDER,
    SERIES_YEARS,
};
