use lifehub_core::db::DbError;
use lifehub_core::repo::state_repo::encode_state;
use lifehub_core::{
    AppState, AppStore, IntegrityError, ItemData, MemoryStateRepository, Note, Notebook,
    NotebookItem, PropertyDefinition, PropertyType, PropertyValue, RepoError, RepoResult,
    SqliteStateRepository, StateRepository, StoreError, ValidationPolicy, DEFAULT_STORAGE_KEY,
};
use std::cell::Cell;
use std::rc::Rc;
use tempfile::TempDir;
use uuid::Uuid;

struct FailingRepository {
    attempts: Rc<Cell<usize>>,
}

impl StateRepository for FailingRepository {
    fn load_state(&self) -> RepoResult<Option<AppState>> {
        Ok(None)
    }

    fn save_state(&mut self, _state: &AppState) -> RepoResult<()> {
        self.attempts.set(self.attempts.get() + 1);
        Err(RepoError::Db(DbError::MissingBlobTable))
    }
}

#[test]
fn sqlite_repository_round_trips_full_state() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("lifehub.sqlite3");

    let (work_id, note_id, table_item_id) = {
        let repo = SqliteStateRepository::open(&db_path, DEFAULT_STORAGE_KEY).unwrap();
        let mut store = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
        let work = store.create_notebook("Work", None, None).unwrap();
        let note = store.create_note(work.id, "Standup").unwrap();
        store
            .update_note_content(note.data_id(), "daily sync")
            .unwrap();
        store.add_tag_to_item(note.id, "meeting").unwrap();
        let status = PropertyDefinition::new("Status", PropertyType::Select)
            .with_options(["Todo", "Done"]);
        let table = store
            .create_table(work.id, "Tasks", vec![status.clone()])
            .unwrap();
        store
            .add_table_record(table.data_id(), vec![PropertyValue::new(status.id, "Todo")])
            .unwrap();
        store.set_search_query("sync");
        (work.id, note.id, table.id)
    };

    let repo = SqliteStateRepository::open(&db_path, DEFAULT_STORAGE_KEY).unwrap();
    let store = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
    let state = store.state();

    assert_eq!(state.notebooks.len(), 1);
    assert_eq!(state.notebooks[0].id, work_id);
    assert_eq!(state.current_notebook_id, Some(work_id));
    assert_eq!(state.current_item_id, Some(table_item_id));
    assert_eq!(state.search_query, "sync");
    assert_eq!(state.tags, vec!["meeting".to_string()]);

    let note = store.find_item(note_id).unwrap().as_note().unwrap();
    assert_eq!(note.content, "daily sync");
    assert_eq!(note.tags, vec!["meeting".to_string()]);

    let table = store.find_item(table_item_id).unwrap().as_table().unwrap();
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.views.len(), 1);
}

#[test]
fn sqlite_repository_keeps_keys_separate() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("lifehub.sqlite3");

    {
        let repo = SqliteStateRepository::open(&db_path, "profile-a").unwrap();
        let mut store = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
        store.create_notebook("Only in A", None, None).unwrap();
    }

    let repo = SqliteStateRepository::open(&db_path, "profile-b").unwrap();
    assert_eq!(repo.key(), "profile-b");
    assert!(repo.load_blob().unwrap().is_none());
    let store = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
    assert!(store.state().notebooks.is_empty());
}

#[test]
fn every_successful_mutation_saves_once() {
    let mut store = AppStore::open(MemoryStateRepository::new(), ValidationPolicy::Strict).unwrap();
    let work = store.create_notebook("Work", None, None).unwrap();
    store.create_note(work.id, "Standup").unwrap();
    assert_eq!(store.repository().save_count(), 2);

    store.create_note(Uuid::new_v4(), "Orphan").unwrap_err();
    store.create_notebook(" ", None, None).unwrap_err();
    assert_eq!(store.repository().save_count(), 2);

    let repo = store.into_repository();
    let reloaded = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
    assert_eq!(reloaded.state().item_count(), 1);
}

#[test]
fn stored_document_is_reused_on_open() {
    let mut state = AppState::default();
    state.search_query = "carry over".to_string();
    state.tags.push("kept".to_string());
    let blob = encode_state(&state).unwrap();

    let store = AppStore::open(
        MemoryStateRepository::with_blob(blob),
        ValidationPolicy::Strict,
    )
    .unwrap();
    assert_eq!(store.state(), &state);
    assert_eq!(store.repository().save_count(), 0);
}

#[test]
fn newer_document_version_fails_open() {
    let repo = MemoryStateRepository::with_blob(r#"{"version":2,"state":{}}"#);
    let err = AppStore::open(repo, ValidationPolicy::Strict).err().unwrap();
    assert!(matches!(
        err,
        StoreError::Load(RepoError::UnsupportedDocumentVersion { found: 2, .. })
    ));
}

#[test]
fn save_failure_does_not_fail_the_mutation() {
    let attempts = Rc::new(Cell::new(0usize));
    let repo = FailingRepository {
        attempts: Rc::clone(&attempts),
    };
    let mut store = AppStore::open(repo, ValidationPolicy::Strict).unwrap();
    let notified = Rc::new(Cell::new(false));
    {
        let notified = Rc::clone(&notified);
        store.subscribe(move |_| notified.set(true));
    }

    let work = store.create_notebook("Work", None, None).unwrap();
    assert_eq!(attempts.get(), 1);
    assert!(notified.get());
    assert!(store.find_notebook(work.id).is_some());
}

#[test]
fn loaded_document_with_dangling_references_is_repaired() {
    let mut work = Notebook::new("Work", None, None);
    let stray_owner = Uuid::new_v4();
    let mut item = NotebookItem::wrap(ItemData::Note(Note::new(stray_owner, "Standup")));
    item.notebook_id = stray_owner;
    let item_id = item.id;
    work.items.push(item);
    let work_id = work.id;

    let state = AppState {
        notebooks: vec![work],
        current_notebook_id: Some(Uuid::new_v4()),
        current_item_id: Some(Uuid::new_v4()),
        ..AppState::default()
    };
    let blob = encode_state(&state).unwrap();

    let store = AppStore::open(
        MemoryStateRepository::with_blob(blob),
        ValidationPolicy::Strict,
    )
    .unwrap();
    assert_eq!(store.state().current_notebook_id, None);
    assert_eq!(store.state().current_item_id, None);

    let item = store.find_item(item_id).unwrap();
    assert_eq!(item.notebook_id, work_id);
    assert_eq!(item.as_note().unwrap().notebook_id, work_id);
}

#[test]
fn loaded_document_with_duplicate_ids_is_rejected() {
    let work = Notebook::new("Work", None, None);
    let state = AppState {
        notebooks: vec![work.clone(), work.clone()],
        ..AppState::default()
    };
    let blob = encode_state(&state).unwrap();

    let err = AppStore::open(
        MemoryStateRepository::with_blob(blob),
        ValidationPolicy::Strict,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        StoreError::Load(RepoError::Integrity(IntegrityError::DuplicateNotebookId(id)))
            if id == work.id
    ));

    let mut work = Notebook::new("Work", None, None);
    let note = NotebookItem::wrap(ItemData::Note(Note::new(work.id, "Standup")));
    work.items.push(note.clone());
    work.items.push(note.clone());
    let state = AppState {
        notebooks: vec![work],
        ..AppState::default()
    };
    let err = AppStore::with_state(MemoryStateRepository::new(), ValidationPolicy::Strict, state)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::Load(RepoError::Integrity(IntegrityError::DuplicateItemId(id)))
            if id == note.id
    ));
}

#[test]
fn with_state_uses_given_state_without_reading_or_saving() {
    let mut work = Notebook::new("Work", None, None);
    let note = NotebookItem::wrap(ItemData::Note(Note::new(work.id, "Standup")));
    work.items.push(note.clone());
    let state = AppState {
        current_notebook_id: Some(work.id),
        current_item_id: Some(note.id),
        notebooks: vec![work],
        ..AppState::default()
    };

    let repo =
        MemoryStateRepository::with_blob(r#"{"version":1,"state":{"searchQuery":"ignored"}}"#);
    let mut store =
        AppStore::with_state(repo, ValidationPolicy::Permissive, state.clone()).unwrap();
    assert_eq!(store.state(), &state);
    assert_eq!(store.policy(), ValidationPolicy::Permissive);
    assert_eq!(store.repository().save_count(), 0);
    assert_eq!(store.current_item().unwrap().id, note.id);

    store.set_search_query("x");
    assert_eq!(store.repository().save_count(), 1);
}
