//! Checkpoint table layout

/// One completed record per symbol; `record` holds the JSON-encoded
/// `StockRecord` and `saved_at` the RFC 3339 time of the write
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS checkpoints (
    symbol TEXT PRIMARY KEY NOT NULL,
    record TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// Creates the checkpoint table unless it already exists
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
