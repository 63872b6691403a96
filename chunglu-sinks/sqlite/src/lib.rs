//! Durable SQLite-backed edge store for chunglu generation runs.

mod errors;
mod schema;
mod store;

pub use errors::SqliteSinkError;
pub use schema::{DEFAULT_STORE_FILE_NAME, SCHEMA_VERSION};
pub use store::SqliteEdgeStore;
