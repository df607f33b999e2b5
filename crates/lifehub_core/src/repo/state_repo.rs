//! Persisted state repository contracts and implementations.
//!
//! # Responsibility
//! - Encode/decode the whole `AppState` as one versioned JSON document.
//! - Store that document under a single key in a key-value blob store.
//!
//! # Invariants
//! - A save always overwrites the full document; there are no partial writes.
//! - Documents with a newer `version` than supported are rejected on load.
//!
//! # See also
//! - `crate::db` for SQLite bootstrap and migrations.

use crate::db::{ensure_blob_table, open_db, open_db_in_memory, DbError};
use crate::model::now_epoch_ms;
use crate::model::state::{AppState, IntegrityError};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Blob key used when no other key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "life-hub-storage";

/// Version of the persisted state document written by this binary.
pub const STATE_DOCUMENT_VERSION: u32 = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from state persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// State document cannot be encoded or decoded.
    Serialization(serde_json::Error),
    /// Stored document was written by a newer binary.
    UnsupportedDocumentVersion { found: u32, latest_supported: u32 },
    /// Stored tree breaks an id invariant that cannot be repaired.
    Integrity(IntegrityError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid state document: {err}"),
            Self::UnsupportedDocumentVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "state document version {found} is newer than supported {latest_supported}"
            ),
            Self::Integrity(err) => write!(f, "corrupt state document: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedDocumentVersion { .. } => None,
            Self::Integrity(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<IntegrityError> for RepoError {
    fn from(value: IntegrityError) -> Self {
        Self::Integrity(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence collaborator for the store.
pub trait StateRepository {
    /// Loads the persisted state, or `None` when nothing was saved yet.
    fn load_state(&self) -> RepoResult<Option<AppState>>;
    /// Overwrites the persisted state with `state`.
    fn save_state(&mut self, state: &AppState) -> RepoResult<()>;
}

#[derive(Serialize)]
struct StateDocumentRef<'a> {
    version: u32,
    state: &'a AppState,
}

#[derive(Deserialize)]
struct StateDocument {
    version: u32,
    state: AppState,
}

/// Encodes `state` as a versioned JSON document.
pub fn encode_state(state: &AppState) -> RepoResult<String> {
    let document = StateDocumentRef {
        version: STATE_DOCUMENT_VERSION,
        state,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Decodes a versioned JSON document produced by [`encode_state`].
///
/// The decoded tree is repaired before it is returned: dangling cursors are
/// cleared and back-references rewritten. Duplicate ids fail the load.
pub fn decode_state(blob: &str) -> RepoResult<AppState> {
    let document: StateDocument = serde_json::from_str(blob)?;
    if document.version > STATE_DOCUMENT_VERSION {
        return Err(RepoError::UnsupportedDocumentVersion {
            found: document.version,
            latest_supported: STATE_DOCUMENT_VERSION,
        });
    }

    let mut state = document.state;
    let repairs = state.repair()?;
    if !repairs.is_clean() {
        warn!(
            "event=state_repair module=repo status=ok cleared_cursors={} back_references={}",
            repairs.cleared_cursors, repairs.back_references
        );
    }
    Ok(state)
}

/// SQLite-backed key-value blob repository.
pub struct SqliteStateRepository {
    conn: Connection,
    key: String,
}

impl SqliteStateRepository {
    /// Wraps a migrated connection, storing state under `key`.
    pub fn try_new(conn: Connection, key: impl Into<String>) -> RepoResult<Self> {
        ensure_blob_table(&conn)?;
        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?, key)
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory(key: impl Into<String>) -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?, key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored document, if present.
    pub fn load_blob(&self) -> RepoResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }
}

impl StateRepository for SqliteStateRepository {
    fn load_state(&self) -> RepoResult<Option<AppState>> {
        self.load_blob()?
            .map(|blob| decode_state(&blob))
            .transpose()
    }

    fn save_state(&mut self, state: &AppState) -> RepoResult<()> {
        let blob = encode_state(state)?;
        self.conn.execute(
            "INSERT INTO kv_blobs (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), blob, now_epoch_ms()],
        )?;
        Ok(())
    }
}

/// Process-local repository holding the encoded document in memory.
///
/// Used for tests and ephemeral sessions. Encoding still runs on every save
/// so serialization problems surface the same way as with SQLite.
#[derive(Debug, Default, Clone)]
pub struct MemoryStateRepository {
    blob: Option<String>,
    saves: usize,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an already encoded document.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful saves since construction.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StateRepository for MemoryStateRepository {
    fn load_state(&self) -> RepoResult<Option<AppState>> {
        self.blob.as_deref().map(decode_state).transpose()
    }

    fn save_state(&mut self, state: &AppState) -> RepoResult<()> {
        self.blob = Some(encode_state(state)?);
        self.saves += 1;
        Ok(())
    }
}
