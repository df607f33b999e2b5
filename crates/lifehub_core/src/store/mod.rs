//! Authoritative in-memory state store.
//!
//! # Responsibility
//! - Own the single writable `AppState` and every mutation over it.
//! - Persist the whole state and notify subscribers after each mutation.
//!
//! # Invariants
//! - Failed operations leave state untouched, skip persistence and skip
//!   notification.
//! - Every mutation bumps `updated_at` on the changed entity and each
//!   ancestor up to the owning notebook.
//! - Persistence is best effort: save failures are logged, never returned.
//!
//! # See also
//! - `crate::repo::state_repo` for the persistence contract.

mod error;
mod items;
mod notebooks;
mod patch;
mod subscribers;
mod tables;
mod tags;

pub use error::{StoreError, StoreResult};
pub use patch::{ItemPatch, NotebookPatch, PropertyDefinitionPatch};
pub use subscribers::SubscriptionId;

use crate::config::CoreConfig;
use crate::model::notebook::{ItemData, ItemId, Note, NoteId, Notebook, NotebookId, NotebookItem};
use crate::model::now_epoch_ms;
use crate::model::state::AppState;
use crate::model::table::{Table, TableId};
use crate::repo::state_repo::{RepoError, StateRepository};
use crate::search::substring::search_items;
use crate::validate::{validate_name, validate_tag, ValidationPolicy};
use log::{info, warn};
use std::time::Instant;
use subscribers::Subscribers;

/// Location of one item inside `AppState::notebooks`.
#[derive(Debug, Clone, Copy)]
struct Position {
    notebook: usize,
    item: usize,
}

/// Single-writer store over one `AppState` tree.
pub struct AppStore<R: StateRepository> {
    state: AppState,
    repo: R,
    policy: ValidationPolicy,
    subscribers: Subscribers,
}

impl<R: StateRepository> AppStore<R> {
    /// Loads the persisted state from `repo`, or starts empty when none exists.
    ///
    /// # Errors
    /// - Returns `StoreError::Load` when the stored document cannot be read
    ///   or holds duplicate ids.
    pub fn open(repo: R, policy: ValidationPolicy) -> StoreResult<Self> {
        let started_at = Instant::now();
        let state = match repo.load_state() {
            Ok(state) => state.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        info!(
            "event=store_load module=store status=ok notebooks={} items={} duration_ms={}",
            state.notebooks.len(),
            state.item_count(),
            started_at.elapsed().as_millis()
        );
        Ok(Self::assemble(repo, policy, state))
    }

    /// Opens with the validation policy from `config`.
    pub fn from_config(repo: R, config: &CoreConfig) -> StoreResult<Self> {
        Self::open(repo, config.validation)
    }

    /// Wraps an explicit initial state without reading the repository.
    ///
    /// The state is repaired first, the same way a loaded document is.
    ///
    /// # Errors
    /// - Returns `StoreError::Load` when `state` holds duplicate ids.
    pub fn with_state(
        repo: R,
        policy: ValidationPolicy,
        mut state: AppState,
    ) -> StoreResult<Self> {
        let repairs = state.repair().map_err(RepoError::from)?;
        if !repairs.is_clean() {
            warn!(
                "event=state_repair module=store status=ok cleared_cursors={} back_references={}",
                repairs.cleared_cursors, repairs.back_references
            );
        }
        Ok(Self::assemble(repo, policy, state))
    }

    fn assemble(repo: R, policy: ValidationPolicy, state: AppState) -> Self {
        Self {
            state,
            repo,
            policy,
            subscribers: Subscribers::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Registers a listener called with the new state after each mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        self.subscribers.add(Box::new(listener))
    }

    /// Removes a listener. Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn current_notebook(&self) -> Option<&Notebook> {
        self.state.current_notebook()
    }

    pub fn current_item(&self) -> Option<&NotebookItem> {
        self.state.current_item()
    }

    pub fn find_notebook(&self, notebook_id: NotebookId) -> Option<&Notebook> {
        self.state.notebook(notebook_id)
    }

    pub fn find_item(&self, item_id: ItemId) -> Option<&NotebookItem> {
        self.state.item(item_id)
    }

    /// Global tag corpus in first-use order.
    pub fn tags(&self) -> &[String] {
        &self.state.tags
    }

    /// Runs substring search over the current state.
    pub fn search_items(&self, query: &str) -> Vec<&NotebookItem> {
        search_items(&self.state, query)
    }

    /// Stores the raw query text for display. Does not run a search.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.commit("search_query_set");
    }

    fn commit(&mut self, event: &'static str) {
        if let Err(err) = self.repo.save_state(&self.state) {
            warn!(
                "event=state_persist module=store status=error trigger={} error={}",
                event, err
            );
        }
        self.subscribers.notify(&self.state);
    }

    fn check_name(&self, field: &'static str, value: &str) -> StoreResult<()> {
        if self.policy.is_strict() {
            validate_name(field, value)?;
        }
        Ok(())
    }

    fn check_tag(&self, tag: &str) -> StoreResult<()> {
        if self.policy.is_strict() {
            validate_tag(tag)?;
        }
        Ok(())
    }

    fn notebook_index(&self, notebook_id: NotebookId) -> StoreResult<usize> {
        self.state
            .notebooks
            .iter()
            .position(|notebook| notebook.id == notebook_id)
            .ok_or(StoreError::NotebookNotFound(notebook_id))
    }

    fn locate(&self, matches: impl Fn(&NotebookItem) -> bool) -> Option<Position> {
        self.state
            .notebooks
            .iter()
            .enumerate()
            .find_map(|(notebook, current)| {
                current
                    .items
                    .iter()
                    .position(&matches)
                    .map(|item| Position { notebook, item })
            })
    }

    /// Applies `edit` to one item wrapper, then bumps item and notebook.
    fn edit_item<T>(
        &mut self,
        item_id: ItemId,
        edit: impl FnOnce(&mut NotebookItem, i64) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let at = self
            .locate(|item| item.id == item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let now = now_epoch_ms();
        let notebook = &mut self.state.notebooks[at.notebook];
        let item = &mut notebook.items[at.item];
        let output = edit(item, now)?;
        item.updated_at = now;
        notebook.updated_at = now;
        Ok(output)
    }

    /// Applies `edit` to one note payload, then bumps note, item and notebook.
    fn edit_note<T>(
        &mut self,
        note_id: NoteId,
        edit: impl FnOnce(&mut Note) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let at = self
            .locate(|item| item.as_note().is_some_and(|note| note.id == note_id))
            .ok_or(StoreError::NoteNotFound(note_id))?;
        let now = now_epoch_ms();
        let notebook = &mut self.state.notebooks[at.notebook];
        let item = &mut notebook.items[at.item];
        let ItemData::Note(note) = &mut item.data else {
            return Err(StoreError::NoteNotFound(note_id));
        };
        let output = edit(note)?;
        note.updated_at = now;
        item.updated_at = now;
        notebook.updated_at = now;
        Ok(output)
    }

    /// Applies `edit` to one table payload, then bumps table, item and notebook.
    fn edit_table<T>(
        &mut self,
        table_id: TableId,
        edit: impl FnOnce(&mut Table) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let at = self
            .locate(|item| item.as_table().is_some_and(|table| table.id == table_id))
            .ok_or(StoreError::TableNotFound(table_id))?;
        let now = now_epoch_ms();
        let notebook = &mut self.state.notebooks[at.notebook];
        let item = &mut notebook.items[at.item];
        let ItemData::Table(table) = &mut item.data else {
            return Err(StoreError::TableNotFound(table_id));
        };
        let output = edit(table)?;
        table.updated_at = now;
        item.updated_at = now;
        notebook.updated_at = now;
        Ok(output)
    }
}
