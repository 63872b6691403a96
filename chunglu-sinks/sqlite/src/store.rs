//! Batched edge persistence on SQLite.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chunglu_core::{Edge, EdgeSink, SinkError};
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument, warn};

use crate::errors::SqliteSinkError;
use crate::schema::{self, COUNT_EDGES, DEFAULT_STORE_FILE_NAME, INSERT_EDGE, SELECT_EDGES};

/// Durable edge store writing one JSON record per edge.
///
/// Accepted edges are buffered and committed in one transaction per batch;
/// [`EdgeSink::flush`] commits the remainder. [`EdgeSink::persisted`] counts
/// the records this handle has committed; [`SqliteEdgeStore::count`] also
/// includes records left by earlier runs.
///
/// # Examples
/// ```
/// use chunglu_core::{Edge, EdgeSink};
/// use chunglu_sinks_sqlite::SqliteEdgeStore;
///
/// let mut store = SqliteEdgeStore::open_in_memory()?;
/// store.persist(Edge::new(2, 1))?;
/// store.persist(Edge::new(2, 1))?;
/// store.flush()?;
/// assert_eq!(store.persisted(), 2);
/// assert_eq!(store.edges()?, vec![Edge::new(2, 1), Edge::new(2, 1)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SqliteEdgeStore {
    conn: Connection,
    location: String,
    nonce: u64,
    next_sequence: u64,
    pending: Vec<(String, String)>,
    batch_size: NonZeroUsize,
    committed: u64,
}

impl SqliteEdgeStore {
    /// Records buffered before a batch is committed, unless configured.
    pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1024) {
        Some(size) => size,
        None => unreachable!(),
    };

    /// Opens or creates a store at `path`.
    ///
    /// A directory path resolves to `edges.sqlite3` inside it. Missing
    /// parent directories are created.
    ///
    /// # Errors
    /// Returns [`SqliteSinkError::Io`] when the parent directory cannot be
    /// created, [`SqliteSinkError::SchemaVersionMismatch`] when the file holds
    /// an incompatible store, and [`SqliteSinkError::Sqlite`] for database
    /// failures.
    #[instrument(name = "sqlite.open", err, skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteSinkError> {
        let path = resolve_store_path(path.as_ref());
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SqliteSinkError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(&path)?;
        schema::configure(&conn)?;
        let store = Self::from_connection(conn, path.display().to_string())?;
        info!(existing = store.count()?, "edge store opened");
        Ok(store)
    }

    /// Opens a transient store that lives as long as the value.
    ///
    /// # Errors
    /// Returns [`SqliteSinkError::Sqlite`] when the database cannot be
    /// created.
    pub fn open_in_memory() -> Result<Self, SqliteSinkError> {
        Self::from_connection(Connection::open_in_memory()?, ":memory:".to_owned())
    }

    fn from_connection(conn: Connection, location: String) -> Result<Self, SqliteSinkError> {
        schema::initialize(&conn)?;
        Ok(Self {
            conn,
            location,
            nonce: rand::random(),
            next_sequence: 0,
            pending: Vec::new(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            committed: 0,
        })
    }

    /// Sets how many records are buffered per transaction.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Returns the configured batch size.
    #[must_use]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Returns where the store lives.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the number of buffered, uncommitted records.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Counts committed records, including those of earlier runs.
    ///
    /// # Errors
    /// Returns [`SqliteSinkError::Sqlite`] when the query fails.
    pub fn count(&self) -> Result<u64, SqliteSinkError> {
        let count: i64 = self.conn.query_row(COUNT_EDGES, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Reads every committed edge back in insertion order.
    ///
    /// # Errors
    /// Returns [`SqliteSinkError::Decode`] when a record does not hold an
    /// edge and [`SqliteSinkError::Sqlite`] when the query fails.
    pub fn edges(&self) -> Result<Vec<Edge>, SqliteSinkError> {
        self.read_edges(-1)
    }

    /// Reads at most `limit` committed edges in insertion order.
    ///
    /// # Errors
    /// Same as [`SqliteEdgeStore::edges`].
    pub fn edges_limited(&self, limit: usize) -> Result<Vec<Edge>, SqliteSinkError> {
        self.read_edges(i64::try_from(limit).unwrap_or(i64::MAX))
    }

    fn read_edges(&self, limit: i64) -> Result<Vec<Edge>, SqliteSinkError> {
        let mut stmt = self.conn.prepare_cached(SELECT_EDGES)?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.map(|row| {
            let (key, value) = row?;
            serde_json::from_str(&value).map_err(|source| SqliteSinkError::Decode { key, source })
        })
        .collect()
    }

    fn record_key(&self, sequence: u64) -> String {
        format!("{:016x}-{sequence:016x}", self.nonce)
    }

    /// Commits every buffered record in one transaction. On failure the
    /// buffer is kept so the commit can be retried.
    fn commit_pending(&mut self) -> Result<(), SqliteSinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_EDGE)?;
            for (key, value) in &self.pending {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;

        let written = self.pending.len() as u64;
        self.pending.clear();
        self.committed += written;
        debug!(written, committed = self.committed, "edge batch committed");
        Ok(())
    }
}

impl EdgeSink for SqliteEdgeStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn persist(&mut self, edge: Edge) -> Result<(), SinkError> {
        if self.pending.len() >= self.batch_size.get() {
            self.commit_pending()?;
        }
        let value = serde_json::to_string(&edge)
            .map_err(|source| SqliteSinkError::Encode { edge, source })?;
        let key = self.record_key(self.next_sequence);
        self.next_sequence += 1;
        self.pending.push((key, value));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.commit_pending()?;
        Ok(())
    }

    fn persisted(&self) -> u64 {
        self.committed
    }
}

impl Drop for SqliteEdgeStore {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                location = %self.location,
                discarded = self.pending.len(),
                "edge store dropped with uncommitted records"
            );
        }
    }
}

fn resolve_store_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_STORE_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
