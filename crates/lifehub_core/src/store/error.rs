//! Store error taxonomy.

use crate::model::notebook::{ItemId, NoteId, NotebookId};
use crate::model::table::{PropertyId, RecordId, TableId};
use crate::repo::state_repo::RepoError;
use crate::validate::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected store operation. State is left untouched and no
/// subscriber is notified when an operation returns one of these.
#[derive(Debug)]
pub enum StoreError {
    NotebookNotFound(NotebookId),
    ItemNotFound(ItemId),
    NoteNotFound(NoteId),
    TableNotFound(TableId),
    RecordNotFound {
        table_id: TableId,
        record_id: RecordId,
    },
    PropertyNotFound {
        table_id: TableId,
        property_id: PropertyId,
    },
    /// A property id appears twice in one schema or one record.
    DuplicateProperty {
        table_id: TableId,
        property_id: PropertyId,
    },
    Validation(ValidationError),
    /// Initial state could not be loaded or breaks an id invariant.
    Load(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::TableNotFound(id) => write!(f, "table not found: {id}"),
            Self::RecordNotFound {
                table_id,
                record_id,
            } => write!(f, "record {record_id} not found in table {table_id}"),
            Self::PropertyNotFound {
                table_id,
                property_id,
            } => write!(f, "property {property_id} not found in table {table_id}"),
            Self::DuplicateProperty {
                table_id,
                property_id,
            } => write!(f, "property {property_id} is duplicated in table {table_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Load(err) => write!(f, "failed to load state: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Load(value)
    }
}
