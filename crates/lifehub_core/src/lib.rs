//! Core domain logic for LifeHub.
//! This crate is the single source of truth for notebook tree invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod store;
pub mod validate;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::notebook::{ItemData, ItemId, ItemType, Note, NoteId, Notebook, NotebookId, NotebookItem};
pub use model::state::{AppState, IntegrityError, Repairs};
pub use model::table::{
    FilterConfig, FilterOperator, GroupConfig, PropertyDefinition, PropertyId, PropertyType,
    PropertyValue, RecordId, SortConfig, SortDirection, Table, TableId, TableRecord, TableView,
    ViewId, ViewType, DEFAULT_VIEW_NAME,
};
pub use repo::state_repo::{
    MemoryStateRepository, RepoError, RepoResult, SqliteStateRepository, StateRepository,
    DEFAULT_STORAGE_KEY,
};
pub use search::substring::{matching_items, search_items, value_text, MatchingItems};
pub use store::{
    AppStore, ItemPatch, NotebookPatch, PropertyDefinitionPatch, StoreError, StoreResult,
    SubscriptionId,
};
pub use validate::{ValidationError, ValidationPolicy};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
