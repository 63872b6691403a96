//! Table layout of an edge store.
//!
//! Each record is one edge stored under a unique generated key with the
//! edge encoded as a JSON value. Keys never derive from edge content, so
//! repeated edges occupy separate records.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::SqliteSinkError;

/// Schema version written to new stores and required when reopening.
pub const SCHEMA_VERSION: &str = "1";

/// File name used when the store path names a directory.
pub const DEFAULT_STORE_FILE_NAME: &str = "edges.sqlite3";

const CREATE_EDGES: &str = r"
CREATE TABLE IF NOT EXISTS edges (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
";

const CREATE_METADATA: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
";

pub(crate) const INSERT_EDGE: &str = "INSERT INTO edges (key, value) VALUES (?1, ?2)";
pub(crate) const COUNT_EDGES: &str = "SELECT COUNT(*) FROM edges";
pub(crate) const SELECT_EDGES: &str = "SELECT key, value FROM edges ORDER BY rowid LIMIT ?1";

/// Applies connection pragmas tuned for a single bulk writer.
pub(crate) fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -64_000)?;
    Ok(())
}

/// Creates missing tables and checks the recorded schema version.
pub(crate) fn initialize(conn: &Connection) -> Result<(), SqliteSinkError> {
    conn.execute_batch(CREATE_EDGES)?;
    conn.execute_batch(CREATE_METADATA)?;

    let recorded: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match recorded {
        Some(found) if found != SCHEMA_VERSION => Err(SqliteSinkError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        Some(_) => Ok(()),
        None => {
            conn.execute(
                "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        }
    }
}
