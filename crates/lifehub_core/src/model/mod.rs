//! Notebook tree domain model.
//!
//! # Responsibility
//! - Define the canonical notebook → item → (note | table) tree.
//! - Keep serialized field names stable for the persisted state document.
//!
//! # Invariants
//! - Every entity is identified by a random UUID v4.
//! - Each child has exactly one owner; back-references (`notebook_id`,
//!   `table_id`) are copies, not ownership edges.
//! - Timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod notebook;
pub mod state;
pub mod table;

/// Returns the current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` when the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
