//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the store writes through.
//! - Isolate SQLite and document encoding details from store logic.
//!
//! # Invariants
//! - Repositories persist whole state documents, never partial subtrees.

pub mod state_repo;
