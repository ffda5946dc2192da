//! Storage module for checkpointing harvested records
//!
//! This module handles all database operations for the harvester:
//! - SQLite database initialization and schema management
//! - One durable write per completed symbol
//! - Key scans for resuming and full scans for export

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCheckpointStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (or creates) the checkpoint database at `path`
///
/// The returned store releases the underlying file when dropped.
pub fn open_checkpoint(path: &Path) -> StorageResult<SqliteCheckpointStore> {
    SqliteCheckpointStore::open(path)
}
