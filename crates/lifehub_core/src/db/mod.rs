//! SQLite storage for the state blob.
//!
//! The database holds one table, `kv_blobs`, mapping a storage key to the
//! encoded state document. This module owns opening connections, bringing
//! the schema up to date and checking that the blob table is usable.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection handed out by [`open_db`] / [`open_db_in_memory`] has the
//!   blob table in place.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Name of the key-value table holding state documents.
pub const BLOB_TABLE: &str = "kv_blobs";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was migrated by a newer binary.
    SchemaTooNew { found: u32, latest_supported: u32 },
    /// Connection has no `kv_blobs` table, e.g. it was never migrated.
    MissingBlobTable,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew {
                found,
                latest_supported,
            } => write!(
                f,
                "blob store schema version {found} is newer than supported {latest_supported}"
            ),
            Self::MissingBlobTable => write!(f, "blob store requires table `{BLOB_TABLE}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::MissingBlobTable => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Fails with [`DbError::MissingBlobTable`] unless `kv_blobs` exists.
pub fn ensure_blob_table(conn: &Connection) -> DbResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [BLOB_TABLE],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(DbError::MissingBlobTable);
    }
    Ok(())
}
