//! Notebook, item and note models.
//!
//! # Responsibility
//! - Define notebooks and the items they own.
//! - Model the item payload as a closed sum type (`ItemData`).
//!
//! # Invariants
//! - `NotebookItem::kind()` is derived from `data`; the two can never disagree.
//! - `NotebookItem::name` mirrors the payload's own title/name.
//! - `Note::tags` holds no duplicates.

use crate::model::now_epoch_ms;
use crate::model::table::Table;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a notebook.
pub type NotebookId = Uuid;
/// Stable identifier of a notebook item wrapper.
pub type ItemId = Uuid;
/// Stable identifier of a note payload.
pub type NoteId = Uuid;

/// Top-level container grouping related items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: NotebookId,
    pub name: String,
    /// Presentational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Presentational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Items owned exclusively by this notebook, in display order.
    #[serde(default)]
    pub items: Vec<NotebookItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Notebook {
    /// Creates an empty notebook with a fresh id.
    pub fn new(name: impl Into<String>, icon: Option<String>, color: Option<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon,
            color,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Finds one owned item by wrapper id.
    pub fn item(&self, item_id: ItemId) -> Option<&NotebookItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Item category, derived from [`ItemData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Note,
    Table,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Table => "table",
        }
    }
}

/// Payload of a notebook item.
///
/// Serialized adjacently tagged as `{"type": "note", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ItemData {
    Note(Note),
    Table(Table),
}

/// A note or table wrapper living inside exactly one notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookItem {
    /// Unique across the whole tree.
    pub id: ItemId,
    /// Denormalized copy of the note title or table name.
    pub name: String,
    /// Back-reference to the owning notebook.
    pub notebook_id: NotebookId,
    #[serde(flatten)]
    pub data: ItemData,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NotebookItem {
    /// Wraps a payload, copying its display name into `name`.
    pub fn wrap(data: ItemData) -> Self {
        let now = now_epoch_ms();
        let (name, notebook_id) = match &data {
            ItemData::Note(note) => (note.title.clone(), note.notebook_id),
            ItemData::Table(table) => (table.name.clone(), table.notebook_id),
        };
        Self {
            id: Uuid::new_v4(),
            name,
            notebook_id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> ItemType {
        match self.data {
            ItemData::Note(_) => ItemType::Note,
            ItemData::Table(_) => ItemType::Table,
        }
    }

    /// Id of the wrapped note or table payload.
    pub fn data_id(&self) -> Uuid {
        match &self.data {
            ItemData::Note(note) => note.id,
            ItemData::Table(table) => table.id,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match &self.data {
            ItemData::Note(note) => Some(note),
            ItemData::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.data {
            ItemData::Table(table) => Some(table),
            ItemData::Note(_) => None,
        }
    }

    /// Renames the wrapper and its payload together.
    pub(crate) fn rename(&mut self, name: String, now: i64) {
        match &mut self.data {
            ItemData::Note(note) => {
                note.title = name.clone();
                note.updated_at = now;
            }
            ItemData::Table(table) => {
                table.name = name.clone();
                table.updated_at = now;
            }
        }
        self.name = name;
        self.updated_at = now;
    }

    /// Points every back-reference below this item at `owner`.
    ///
    /// Returns how many references were rewritten.
    pub(crate) fn adopt(&mut self, owner: NotebookId) -> usize {
        let mut fixed = usize::from(self.notebook_id != owner);
        self.notebook_id = owner;
        match &mut self.data {
            ItemData::Note(note) => {
                fixed += usize::from(note.notebook_id != owner);
                note.notebook_id = owner;
            }
            ItemData::Table(table) => {
                fixed += usize::from(table.notebook_id != owner);
                table.notebook_id = owner;
                let table_id = table.id;
                for record in &mut table.records {
                    fixed += usize::from(record.table_id != table_id);
                    record.table_id = table_id;
                }
            }
        }
        fixed
    }
}

/// Free-form note payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub notebook_id: NotebookId,
    pub title: String,
    /// Serialized rich-text document; opaque to core.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Creates an empty note owned by `notebook_id`.
    pub fn new(notebook_id: NotebookId, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            notebook_id,
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
