//! Item operations: notes, tables, item metadata and the item cursor.

use super::{AppStore, ItemPatch, StoreError, StoreResult};
use crate::model::notebook::{ItemData, ItemId, Note, NoteId, NotebookId, NotebookItem};
use crate::model::now_epoch_ms;
use crate::model::table::{PropertyDefinition, Table};
use crate::repo::state_repo::StateRepository;
use log::debug;
use std::collections::HashSet;

impl<R: StateRepository> AppStore<R> {
    /// Creates an empty note in `notebook_id` and makes it the current item.
    pub fn create_note(
        &mut self,
        notebook_id: NotebookId,
        title: impl Into<String>,
    ) -> StoreResult<NotebookItem> {
        let title = title.into();
        self.check_name("note title", &title)?;
        let index = self.notebook_index(notebook_id)?;

        let item = NotebookItem::wrap(ItemData::Note(Note::new(notebook_id, title)));
        Ok(self.append_item(index, item, "note_create"))
    }

    /// Creates a table with `property_definitions` as its schema and makes it
    /// the current item. The table starts with one "All Records" view.
    pub fn create_table(
        &mut self,
        notebook_id: NotebookId,
        name: impl Into<String>,
        property_definitions: Vec<PropertyDefinition>,
    ) -> StoreResult<NotebookItem> {
        let name = name.into();
        self.check_name("table name", &name)?;
        for definition in &property_definitions {
            self.check_name("property name", &definition.name)?;
        }
        let index = self.notebook_index(notebook_id)?;

        let table = Table::new(notebook_id, name, property_definitions);
        let mut seen = HashSet::new();
        if let Some(duplicate) = table
            .property_definitions
            .iter()
            .find(|definition| !seen.insert(definition.id))
        {
            return Err(StoreError::DuplicateProperty {
                table_id: table.id,
                property_id: duplicate.id,
            });
        }

        let item = NotebookItem::wrap(ItemData::Table(table));
        Ok(self.append_item(index, item, "table_create"))
    }

    /// Applies item-level metadata. Renames reach the note/table payload too.
    pub fn update_item(&mut self, item_id: ItemId, patch: ItemPatch) -> StoreResult<()> {
        if let Some(name) = patch.name.as_deref() {
            self.check_name("item name", name)?;
        }
        self.edit_item(item_id, |item, now| {
            if let Some(name) = patch.name {
                item.rename(name, now);
            }
            Ok(())
        })?;

        debug!("event=item_update module=store status=ok item_id={item_id}");
        self.commit("item_update");
        Ok(())
    }

    /// Removes one item from whichever notebook owns it.
    pub fn delete_item(&mut self, item_id: ItemId) -> StoreResult<NotebookItem> {
        let at = self
            .locate(|item| item.id == item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;

        let notebook = &mut self.state.notebooks[at.notebook];
        let removed = notebook.items.remove(at.item);
        notebook.updated_at = now_epoch_ms();
        if self.state.current_item_id == Some(item_id) {
            self.state.current_item_id = None;
        }

        debug!(
            "event=item_delete module=store status=ok item_id={} kind={}",
            item_id,
            removed.kind().as_str()
        );
        self.commit("item_delete");
        Ok(removed)
    }

    /// Moves the item cursor without touching the notebook cursor.
    pub fn set_current_item(&mut self, item_id: Option<ItemId>) -> StoreResult<()> {
        if let Some(item_id) = item_id {
            self.locate(|item| item.id == item_id)
                .ok_or(StoreError::ItemNotFound(item_id))?;
        }
        self.state.current_item_id = item_id;
        self.commit("current_item_set");
        Ok(())
    }

    /// Replaces the content of the note whose payload id is `note_id`.
    pub fn update_note_content(
        &mut self,
        note_id: NoteId,
        content: impl Into<String>,
    ) -> StoreResult<()> {
        let content = content.into();
        let content_len = content.len();
        self.edit_note(note_id, |note| {
            note.content = content;
            Ok(())
        })?;

        debug!(
            "event=note_update module=store status=ok note_id={} content_len={}",
            note_id, content_len
        );
        self.commit("note_update");
        Ok(())
    }

    fn append_item(
        &mut self,
        notebook_index: usize,
        item: NotebookItem,
        event: &'static str,
    ) -> NotebookItem {
        let created = item.clone();
        let notebook = &mut self.state.notebooks[notebook_index];
        notebook.items.push(item);
        notebook.updated_at = created.updated_at;
        self.state.current_item_id = Some(created.id);

        debug!(
            "event={} module=store status=ok notebook_id={} item_id={} kind={}",
            event,
            created.notebook_id,
            created.id,
            created.kind().as_str()
        );
        self.commit(event);
        created
    }
}
