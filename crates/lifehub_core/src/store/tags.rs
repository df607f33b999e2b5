//! Tag operations.
//!
//! # Invariants
//! - Tags compare by exact, case-sensitive string equality.
//! - The global corpus only grows; removing a tag from a note or record
//!   never prunes it.
//! - Item-level tagging applies to notes only. Table rows are tagged through
//!   the record-level operations.
//! - A call that changes neither the target nor the corpus touches no
//!   timestamps and is neither saved nor notified.

use super::tables::record_mut;
use super::{AppStore, StoreError, StoreResult};
use crate::model::notebook::{ItemData, ItemId, ItemType};
use crate::model::now_epoch_ms;
use crate::model::table::{RecordId, TableId};
use crate::repo::state_repo::StateRepository;
use log::debug;

impl<R: StateRepository> AppStore<R> {
    /// Adds `tag` to the global corpus. Returns `false` when already known.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> StoreResult<bool> {
        let tag = tag.into();
        self.check_tag(&tag)?;
        let added = self.remember_tag(&tag);

        debug!("event=tag_add module=store status=ok added={added}");
        if added {
            self.commit("tag_add");
        }
        Ok(added)
    }

    /// Records `tag` globally and, for note items, on the note itself.
    ///
    /// Returns whether the note's tag list changed; always `false` for tables.
    /// Nothing is saved or notified when neither the note nor the corpus changed.
    pub fn add_tag_to_item(&mut self, item_id: ItemId, tag: impl Into<String>) -> StoreResult<bool> {
        let tag = tag.into();
        self.check_tag(&tag)?;
        let kind = self.item_kind(item_id)?;
        let corpus_changed = self.remember_tag(&tag);

        let added = kind == ItemType::Note && !self.note_has_tag(item_id, &tag);
        if added {
            self.edit_item(item_id, |item, now| {
                if let ItemData::Note(note) = &mut item.data {
                    note.tags.push(tag);
                    note.updated_at = now;
                }
                Ok(())
            })?;
        }

        debug!(
            "event=item_tag_add module=store status=ok item_id={} kind={} added={} corpus_changed={}",
            item_id,
            kind.as_str(),
            added,
            corpus_changed
        );
        if added || corpus_changed {
            self.commit("item_tag_add");
        }
        Ok(added)
    }

    /// Removes `tag` from a note item. Returns whether it was present.
    pub fn remove_tag_from_item(&mut self, item_id: ItemId, tag: &str) -> StoreResult<bool> {
        let kind = self.item_kind(item_id)?;

        let removed = kind == ItemType::Note && self.note_has_tag(item_id, tag);
        if removed {
            self.edit_item(item_id, |item, now| {
                if let ItemData::Note(note) = &mut item.data {
                    note.tags.retain(|current| current != tag);
                    note.updated_at = now;
                }
                Ok(())
            })?;
        }

        debug!(
            "event=item_tag_remove module=store status=ok item_id={} kind={} removed={}",
            item_id,
            kind.as_str(),
            removed
        );
        if removed {
            self.commit("item_tag_remove");
        }
        Ok(removed)
    }

    /// Records `tag` globally and on one table record.
    pub fn add_tag_to_record(
        &mut self,
        table_id: TableId,
        record_id: RecordId,
        tag: impl Into<String>,
    ) -> StoreResult<bool> {
        let tag = tag.into();
        self.check_tag(&tag)?;
        let already_tagged = self.record_has_tag(table_id, record_id, &tag)?;
        let corpus_changed = self.remember_tag(&tag);

        if !already_tagged {
            self.edit_table(table_id, |table| {
                let record = record_mut(table, record_id)?;
                record.tags.push(tag);
                record.updated_at = now_epoch_ms();
                Ok(())
            })?;
        }

        debug!(
            "event=record_tag_add module=store status=ok table_id={} record_id={} added={} corpus_changed={}",
            table_id, record_id, !already_tagged, corpus_changed
        );
        if !already_tagged || corpus_changed {
            self.commit("record_tag_add");
        }
        Ok(!already_tagged)
    }

    /// Removes `tag` from one table record. Returns whether it was present.
    pub fn remove_tag_from_record(
        &mut self,
        table_id: TableId,
        record_id: RecordId,
        tag: &str,
    ) -> StoreResult<bool> {
        let removed = self.record_has_tag(table_id, record_id, tag)?;
        if removed {
            self.edit_table(table_id, |table| {
                let record = record_mut(table, record_id)?;
                record.tags.retain(|current| current != tag);
                record.updated_at = now_epoch_ms();
                Ok(())
            })?;
        }

        debug!(
            "event=record_tag_remove module=store status=ok table_id={} record_id={} removed={}",
            table_id, record_id, removed
        );
        if removed {
            self.commit("record_tag_remove");
        }
        Ok(removed)
    }

    fn remember_tag(&mut self, tag: &str) -> bool {
        if self.state.tags.iter().any(|known| known == tag) {
            return false;
        }
        self.state.tags.push(tag.to_string());
        true
    }

    fn item_kind(&self, item_id: ItemId) -> StoreResult<ItemType> {
        self.state
            .item(item_id)
            .map(|item| item.kind())
            .ok_or(StoreError::ItemNotFound(item_id))
    }

    fn note_has_tag(&self, item_id: ItemId, tag: &str) -> bool {
        self.state
            .item(item_id)
            .and_then(|item| item.as_note())
            .is_some_and(|note| note.tags.iter().any(|current| current == tag))
    }

    fn record_has_tag(&self, table_id: TableId, record_id: RecordId, tag: &str) -> StoreResult<bool> {
        let table = self
            .state
            .item_by_table(table_id)
            .and_then(|item| item.as_table())
            .ok_or(StoreError::TableNotFound(table_id))?;
        let record = table.record(record_id).ok_or(StoreError::RecordNotFound {
            table_id,
            record_id,
        })?;
        Ok(record.tags.iter().any(|current| current == tag))
    }
}
