use std::path::PathBuf;

use chunglu_core::{Edge, SinkError};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Failures raised while opening, writing, or reading an edge store.
#[derive(Debug, Error)]
pub enum SqliteSinkError {
    /// SQLite rejected a statement, pragma, or transaction.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An edge could not be encoded as a JSON record.
    #[error("failed to encode edge {edge}: {source}")]
    Encode {
        /// Edge that failed to encode.
        edge: Edge,
        /// Underlying encoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored record could not be decoded back into an edge.
    #[error("record `{key}` does not hold an edge: {source}")]
    Decode {
        /// Key of the offending record.
        key: String,
        /// Underlying decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The store was written by an incompatible schema.
    #[error("store schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Schema version this build writes.
        expected: &'static str,
        /// Version recorded in the store.
        found: String,
    },
    /// The store's parent directory could not be created.
    #[error("cannot prepare store at {path}: {source}")]
    Io {
        /// Path that could not be prepared.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl SqliteSinkError {
    /// Returns `true` when retrying the failed operation may succeed.
    ///
    /// SQLite reports contention from other connections as busy or locked;
    /// every other failure is permanent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(error) => matches!(
                error.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

impl From<SqliteSinkError> for SinkError {
    fn from(error: SqliteSinkError) -> Self {
        let transient = error.is_transient();
        match error {
            SqliteSinkError::Encode { edge, source } => Self::Serialization {
                edge,
                message: source.to_string().into(),
            },
            other if transient => Self::transient(other.to_string()),
            other => Self::permanent(other.to_string()),
        }
    }
}
