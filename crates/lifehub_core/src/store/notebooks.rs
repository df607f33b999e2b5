//! Notebook operations and the notebook cursor.

use super::{AppStore, NotebookPatch, StoreResult};
use crate::model::notebook::{Notebook, NotebookId};
use crate::model::now_epoch_ms;
use crate::repo::state_repo::StateRepository;
use log::debug;

impl<R: StateRepository> AppStore<R> {
    /// Appends a new empty notebook and makes it current.
    pub fn create_notebook(
        &mut self,
        name: impl Into<String>,
        icon: Option<String>,
        color: Option<String>,
    ) -> StoreResult<Notebook> {
        let name = name.into();
        self.check_name("notebook name", &name)?;

        let notebook = Notebook::new(name, icon, color);
        let created = notebook.clone();
        self.state.current_notebook_id = Some(notebook.id);
        self.state.notebooks.push(notebook);

        debug!(
            "event=notebook_create module=store status=ok notebook_id={} name_len={}",
            created.id,
            created.name.len()
        );
        self.commit("notebook_create");
        Ok(created)
    }

    /// Merges `patch` into notebook metadata.
    pub fn update_notebook(
        &mut self,
        notebook_id: NotebookId,
        patch: NotebookPatch,
    ) -> StoreResult<()> {
        if let Some(name) = patch.name.as_deref() {
            self.check_name("notebook name", name)?;
        }
        let index = self.notebook_index(notebook_id)?;

        let notebook = &mut self.state.notebooks[index];
        patch.apply_to(notebook);
        notebook.updated_at = now_epoch_ms();

        debug!("event=notebook_update module=store status=ok notebook_id={notebook_id}");
        self.commit("notebook_update");
        Ok(())
    }

    /// Removes a notebook together with all of its items.
    ///
    /// Clears `current_notebook_id` when it pointed at the notebook and
    /// `current_item_id` when the current item lived inside it.
    pub fn delete_notebook(&mut self, notebook_id: NotebookId) -> StoreResult<Notebook> {
        let index = self.notebook_index(notebook_id)?;
        let removed = self.state.notebooks.remove(index);

        if self.state.current_notebook_id == Some(notebook_id) {
            self.state.current_notebook_id = None;
        }
        if self
            .state
            .current_item_id
            .is_some_and(|item_id| removed.item(item_id).is_some())
        {
            self.state.current_item_id = None;
        }

        debug!(
            "event=notebook_delete module=store status=ok notebook_id={} removed_items={}",
            notebook_id,
            removed.items.len()
        );
        self.commit("notebook_delete");
        Ok(removed)
    }

    /// Moves the notebook cursor. Always forgets the open item.
    pub fn set_current_notebook(&mut self, notebook_id: Option<NotebookId>) -> StoreResult<()> {
        if let Some(notebook_id) = notebook_id {
            self.notebook_index(notebook_id)?;
        }
        self.state.current_notebook_id = notebook_id;
        self.state.current_item_id = None;
        self.commit("current_notebook_set");
        Ok(())
    }
}
