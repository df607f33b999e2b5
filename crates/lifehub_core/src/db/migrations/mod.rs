//! Blob store schema migrations.
//!
//! Each step is one SQL file applied in its own transaction together with the
//! `user_version` bump, so an interrupted upgrade resumes at the failed step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    name: "kv_blobs",
    sql: include_str!("0001_kv_blobs.sql"),
}];

/// Highest schema version this binary can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the blob store schema up to [`latest_version`].
///
/// Returns the number of steps applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::SchemaTooNew {
            found,
            latest_supported: latest,
        });
    }

    let mut applied = 0usize;
    for step in STEPS.iter().filter(|step| step.version > found) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        tx.commit()?;
        applied += 1;
        info!(
            "event=db_migrate module=db status=ok step={} to_version={}",
            step.name, step.version
        );
    }
    Ok(applied)
}
