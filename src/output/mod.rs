//! Output module for exporting harvested records
//!
//! This module handles:
//! - Reading every checkpointed record
//! - Sorting rows by symbol
//! - Writing the UTF-8 CSV table

mod table;

pub use table::{export_checkpoint, format_series, header, write_records, FIXED_COLUMNS};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
