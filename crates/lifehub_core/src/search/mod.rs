//! In-memory search entry points.
//!
//! # Responsibility
//! - Expose substring search over the notebook tree.
//! - Keep match semantics (fields, case folding, ordering) inside core.

pub mod substring;
