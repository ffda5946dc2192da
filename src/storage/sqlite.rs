//! SQLite checkpoint store
//!
//! This module provides a SQLite-based implementation of the CheckpointStore trait.

use crate::record::{StockRecord, Symbol};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite checkpoint backend
///
/// Holds one connection for the whole run. Each `put` runs in autocommit
/// mode, so it is a single committed transaction by the time it returns.
pub struct SqliteCheckpointStore {
    conn: Connection,
}

impl SqliteCheckpointStore {
    /// Opens or creates the checkpoint database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCheckpointStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // FULL keeps every committed checkpoint across power loss, not only
        // across process termination
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn decode(symbol: &str, json: &str) -> StorageResult<StockRecord> {
    serde_json::from_str(json).map_err(|source| StorageError::Serialization {
        symbol: symbol.to_string(),
        source,
    })
}

impl CheckpointStore for SqliteCheckpointStore {
    fn keys(&self) -> StorageResult<BTreeSet<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT symbol FROM checkpoints")?;

        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|symbol| symbol.map(Symbol::new))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(keys)
    }

    fn get(&self, symbol: &Symbol) -> StorageResult<Option<StockRecord>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM checkpoints WHERE symbol = ?1",
                params![symbol.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|json| decode(symbol.as_str(), &json)).transpose()
    }

    fn put(&mut self, symbol: &Symbol, record: &StockRecord) -> StorageResult<()> {
        let json = serde_json::to_string(record).map_err(|source| {
            StorageError::Serialization {
                symbol: symbol.to_string(),
                source,
            }
        })?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO checkpoints (symbol, record, saved_at) VALUES (?1, ?2, ?3)",
            params![symbol.as_str(), json, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, symbol: &Symbol) -> StorageResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM checkpoints WHERE symbol = ?1",
            params![symbol.as_str()],
        )?;
        Ok(removed > 0)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM checkpoints", [])?;
        Ok(())
    }

    fn values(&self) -> StorageResult<Vec<StockRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT symbol, record FROM checkpoints ORDER BY symbol")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|(symbol, json)| decode(symbol, json))
            .collect()
    }

    fn len(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM checkpoints", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BalanceSheet;
    use chrono::NaiveDate;

    fn record(symbol: &str) -> StockRecord {
        let mut balance_sheet = BalanceSheet::new();
        balance_sheet.insert("Aktywa razem (w tys.)", 1_500);

        StockRecord {
            name: format!("{} SA", symbol),
            symbol: Symbol::new(symbol),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            price: 12.5,
            share_count: 1_000,
            market_cap: 12_500,
            net_profit: vec![3, 2, 1],
            revenue: None,
            price_earnings: Some(8.1),
            dividend_years: 4,
            balance_sheet,
        }
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteCheckpointStore::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_put_and_get() {
        let mut storage = SqliteCheckpointStore::new_in_memory().unwrap();
        let pkn = record("PKN");
        storage.put(&pkn.symbol, &pkn).unwrap();

        let loaded = storage.get(&Symbol::new("PKN")).unwrap();
        assert_eq!(loaded, Some(pkn));
        assert_eq!(storage.get(&Symbol::new("CDR")).unwrap(), None);
    }

    #[test]
    fn test_put_replaces_existing() {
        let mut storage = SqliteCheckpointStore::new_in_memory().unwrap();
        let first = record("PKN");
        storage.put(&first.symbol, &first).unwrap();

        let mut second = record("PKN");
        second.price = 99.0;
        storage.put(&second.symbol, &second).unwrap();

        assert_eq!(storage.len().unwrap(), 1);
        let loaded = storage.get(&Symbol::new("PKN")).unwrap().unwrap();
        assert_eq!(loaded.price, 99.0);
    }

    #[test]
    fn test_keys_values_and_clear() {
        let mut storage = SqliteCheckpointStore::new_in_memory().unwrap();
        assert!(storage.is_empty().unwrap());

        for symbol in ["PKN", "CDR", "ABC"] {
            let r = record(symbol);
            storage.put(&r.symbol, &r).unwrap();
        }

        let keys: Vec<_> = storage.keys().unwrap().into_iter().collect();
        assert_eq!(
            keys,
            vec![Symbol::new("ABC"), Symbol::new("CDR"), Symbol::new("PKN")]
        );

        let symbols: Vec<_> = storage
            .values()
            .unwrap()
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, keys);

        assert!(storage.remove(&Symbol::new("CDR")).unwrap());
        assert!(!storage.remove(&Symbol::new("CDR")).unwrap());
        assert_eq!(storage.len().unwrap(), 2);

        storage.clear().unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.db");

        {
            let mut storage = SqliteCheckpointStore::open(&path).unwrap();
            let r = record("PKN");
            storage.put(&r.symbol, &r).unwrap();
        }

        let storage = SqliteCheckpointStore::open(&path).unwrap();
        assert_eq!(storage.len().unwrap(), 1);
        assert_eq!(storage.values().unwrap()[0], record("PKN"));
    }
}
