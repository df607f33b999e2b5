//! Root application state.
//!
//! # Responsibility
//! - Hold the ordered notebook list, selection cursors and the tag corpus.
//! - Provide read-only lookups across the tree.
//!
//! # Invariants
//! - Notebook, item and payload ids are unique across the tree.
//! - Back-references (`notebook_id`, `table_id`) match the actual owner.
//! - Cursors reference existing entities or are `None`.
//! - `tags` is append-only and never pruned.
//!
//! Documents read from storage go through [`AppState::repair`] before use.

use crate::model::notebook::{ItemId, Notebook, NotebookId, NotebookItem, NoteId};
use crate::model::table::TableId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Tree shape that cannot be repaired without guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityError {
    DuplicateNotebookId(NotebookId),
    DuplicateItemId(ItemId),
    /// Two items wrap a note/table with the same payload id.
    DuplicatePayloadId(Uuid),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNotebookId(id) => write!(f, "duplicate notebook id: {id}"),
            Self::DuplicateItemId(id) => write!(f, "duplicate item id: {id}"),
            Self::DuplicatePayloadId(id) => write!(f, "duplicate note/table id: {id}"),
        }
    }
}

impl Error for IntegrityError {}

/// Counts of what [`AppState::repair`] rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    /// Cursors reset to `None` because they did not resolve.
    pub cleared_cursors: usize,
    /// `notebook_id` / `table_id` fields pointed back at their real owner.
    pub back_references: usize,
}

impl Repairs {
    pub fn is_clean(&self) -> bool {
        self.cleared_cursors == 0 && self.back_references == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub notebooks: Vec<Notebook>,
    #[serde(default)]
    pub current_notebook_id: Option<NotebookId>,
    #[serde(default)]
    pub current_item_id: Option<ItemId>,
    /// UI-local query text; not used by core search.
    #[serde(default)]
    pub search_query: String,
    /// Every tag ever assigned, in first-use order. Autocomplete corpus.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AppState {
    pub fn notebook(&self, notebook_id: NotebookId) -> Option<&Notebook> {
        self.notebooks
            .iter()
            .find(|notebook| notebook.id == notebook_id)
    }

    /// Iterates every item in notebook-then-item order.
    pub fn items(&self) -> impl Iterator<Item = &NotebookItem> {
        self.notebooks
            .iter()
            .flat_map(|notebook| notebook.items.iter())
    }

    pub fn item(&self, item_id: ItemId) -> Option<&NotebookItem> {
        self.items().find(|item| item.id == item_id)
    }

    /// Finds the item wrapping the note with payload id `note_id`.
    pub fn item_by_note(&self, note_id: NoteId) -> Option<&NotebookItem> {
        self.items()
            .find(|item| item.as_note().is_some_and(|note| note.id == note_id))
    }

    /// Finds the item wrapping the table with payload id `table_id`.
    pub fn item_by_table(&self, table_id: TableId) -> Option<&NotebookItem> {
        self.items()
            .find(|item| item.as_table().is_some_and(|table| table.id == table_id))
    }

    /// Notebook selected by `current_notebook_id`, if it resolves.
    pub fn current_notebook(&self) -> Option<&Notebook> {
        self.current_notebook_id
            .and_then(|notebook_id| self.notebook(notebook_id))
    }

    /// Item selected by `current_item_id`, if it resolves.
    pub fn current_item(&self) -> Option<&NotebookItem> {
        self.current_item_id.and_then(|item_id| self.item(item_id))
    }

    /// Restores the tree invariants on a freshly loaded document.
    ///
    /// Dangling cursors are cleared and back-references are rewritten to the
    /// real owner. Duplicate ids are rejected since there is no safe way to
    /// pick a survivor.
    pub fn repair(&mut self) -> Result<Repairs, IntegrityError> {
        let mut repairs = Repairs::default();
        let mut notebook_ids = HashSet::new();
        let mut item_ids = HashSet::new();
        let mut payload_ids = HashSet::new();

        for notebook in &mut self.notebooks {
            if !notebook_ids.insert(notebook.id) {
                return Err(IntegrityError::DuplicateNotebookId(notebook.id));
            }
            let owner = notebook.id;
            for item in &mut notebook.items {
                if !item_ids.insert(item.id) {
                    return Err(IntegrityError::DuplicateItemId(item.id));
                }
                if !payload_ids.insert(item.data_id()) {
                    return Err(IntegrityError::DuplicatePayloadId(item.data_id()));
                }
                repairs.back_references += item.adopt(owner);
            }
        }

        if self
            .current_notebook_id
            .is_some_and(|notebook_id| !notebook_ids.contains(&notebook_id))
        {
            self.current_notebook_id = None;
            repairs.cleared_cursors += 1;
        }
        if self
            .current_item_id
            .is_some_and(|item_id| !item_ids.contains(&item_id))
        {
            self.current_item_id = None;
            repairs.cleared_cursors += 1;
        }

        Ok(repairs)
    }

    /// Total item count across all notebooks.
    pub fn item_count(&self) -> usize {
        self.notebooks
            .iter()
            .map(|notebook| notebook.items.len())
            .sum()
    }
}
