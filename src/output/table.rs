//! CSV table generation
//!
//! One row per symbol, sorted by symbol. Columns are the fixed record
//! fields followed by every balance-sheet item name seen in any record, in
//! first-seen order.

use crate::output::OutputResult;
use crate::record::StockRecord;
use crate::storage::CheckpointStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column headers for the fixed record fields
pub const FIXED_COLUMNS: [&str; 10] = [
    "Nazwa",
    "Symbol",
    "Data",
    "Kurs",
    "Liczba akcji",
    "Kapitalizacja",
    "Zysk netto w ostatnich 10 latach (w tys.)",
    "Przychód w ostatnich 10 latach (w tys.)",
    "Cena/Zysk",
    "Dywidendy w ostatnich 10 latach",
];

/// Renders a series as `[a, b, c]`
pub fn format_series(series: &[i64]) -> String {
    let values: Vec<String> = series.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(", "))
}

/// Full header for a set of records (which must already be sorted)
pub fn header(records: &[StockRecord]) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();

    for record in records {
        for item in record.balance_sheet.iter() {
            if !columns[FIXED_COLUMNS.len()..].contains(&item.name) {
                columns.push(item.name.clone());
            }
        }
    }

    columns
}

fn row(record: &StockRecord, balance_columns: &[String]) -> Vec<String> {
    let mut fields = vec![
        record.name.clone(),
        record.symbol.to_string(),
        record.date.to_string(),
        record.price.to_string(),
        record.share_count.to_string(),
        record.market_cap.to_string(),
        format_series(&record.net_profit),
        record
            .revenue
            .as_deref()
            .map(format_series)
            .unwrap_or_default(),
        record
            .price_earnings
            .map(|v| v.to_string())
            .unwrap_or_default(),
        record.dividend_years.to_string(),
    ];

    fields.extend(balance_columns.iter().map(|name| {
        record
            .balance_sheet
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }));

    fields
}

/// Writes records sorted ascending by symbol; returns the row count
pub fn write_records<W: Write>(mut records: Vec<StockRecord>, writer: W) -> OutputResult<usize> {
    records.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let columns = header(&records);
    let balance_columns = &columns[FIXED_COLUMNS.len()..];

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;
    for record in &records {
        wtr.write_record(row(record, balance_columns))?;
    }
    wtr.flush()?;

    Ok(records.len())
}

/// Exports every checkpointed record to a CSV file at `path`
pub fn export_checkpoint<S: CheckpointStore + ?Sized>(
    store: &S,
    path: &Path,
) -> OutputResult<usize> {
    let records = store.values()?;
    let file = File::create(path)?;
    let rows = write_records(records, BufWriter::new(file))?;
    tracing::debug!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}
