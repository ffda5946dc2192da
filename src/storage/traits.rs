//! Checkpoint store trait and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::record::{StockRecord, Symbol};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error for {symbol}: {source}")]
    Serialization {
        symbol: String,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable keyed store of one completed record per symbol
///
/// The presence of a key means extraction fully completed for that symbol
/// in some run; implementations never hold partial records. Every `put`
/// must be durable before it returns, so that an interrupted crawl keeps
/// everything committed so far.
pub trait CheckpointStore {
    /// Symbols that already have a checkpointed record
    fn keys(&self) -> StorageResult<BTreeSet<Symbol>>;

    /// Gets the record for a symbol
    fn get(&self, symbol: &Symbol) -> StorageResult<Option<StockRecord>>;

    /// Writes (or replaces) the record for a symbol in one atomic step
    fn put(&mut self, symbol: &Symbol, record: &StockRecord) -> StorageResult<()>;

    /// Removes a single symbol, returning whether it was present
    fn remove(&mut self, symbol: &Symbol) -> StorageResult<bool>;

    /// Deletes every checkpointed record
    fn clear(&mut self) -> StorageResult<()>;

    /// All records, ordered by symbol
    fn values(&self) -> StorageResult<Vec<StockRecord>>;

    /// Number of checkpointed symbols
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
