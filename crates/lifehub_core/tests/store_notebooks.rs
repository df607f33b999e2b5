use lifehub_core::{
    AppStore, CoreConfig, ItemPatch, MemoryStateRepository, NotebookPatch, StoreError,
    ValidationError, ValidationPolicy,
};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

fn setup() -> AppStore<MemoryStateRepository> {
    AppStore::open(MemoryStateRepository::new(), ValidationPolicy::Strict).unwrap()
}

#[test]
fn create_notebook_appends_and_selects_it() {
    let mut store = setup();
    let first = store.create_notebook("Work", None, None).unwrap();
    let second = store
        .create_notebook("Home", Some("house".to_string()), Some("green".to_string()))
        .unwrap();

    let names: Vec<_> = store
        .state()
        .notebooks
        .iter()
        .map(|notebook| notebook.name.as_str())
        .collect();
    assert_eq!(names, vec!["Work", "Home"]);
    assert_eq!(store.state().current_notebook_id, Some(second.id));
    assert_eq!(store.current_notebook().unwrap().icon.as_deref(), Some("house"));
    assert!(first.items.is_empty());
}

#[test]
fn update_notebook_merges_fields_and_bumps_timestamp() {
    let mut store = setup();
    let notebook = store
        .create_notebook("Work", Some("briefcase".to_string()), None)
        .unwrap();

    store
        .update_notebook(
            notebook.id,
            NotebookPatch {
                name: Some("Office".to_string()),
                color: Some(Some("blue".to_string())),
                ..NotebookPatch::default()
            },
        )
        .unwrap();

    let updated = store.find_notebook(notebook.id).unwrap();
    assert_eq!(updated.name, "Office");
    assert_eq!(updated.icon.as_deref(), Some("briefcase"));
    assert_eq!(updated.color.as_deref(), Some("blue"));
    assert!(updated.updated_at >= notebook.updated_at);
}

#[test]
fn update_unknown_notebook_reports_not_found() {
    let mut store = setup();
    let missing = Uuid::new_v4();
    let err = store
        .update_notebook(missing, NotebookPatch::rename("x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotebookNotFound(id) if id == missing));
}

#[test]
fn delete_notebook_cascades_to_items() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let home = store.create_notebook("Home", None, None).unwrap();
    store.create_note(work.id, "Standup").unwrap();
    store.create_table(work.id, "Tasks", Vec::new()).unwrap();
    let kept = store.create_note(home.id, "Groceries").unwrap();

    let removed = store.delete_notebook(work.id).unwrap();
    assert_eq!(removed.items.len(), 2);

    assert!(store.find_notebook(work.id).is_none());
    assert!(store.state().items().all(|item| item.notebook_id != work.id));
    assert_eq!(store.state().item_count(), 1);
    assert!(store.find_item(kept.id).is_some());
}

#[test]
fn delete_notebook_clears_cursors_pointing_into_it() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let note = store.create_note(work.id, "Standup").unwrap();
    assert_eq!(store.state().current_notebook_id, Some(work.id));
    assert_eq!(store.state().current_item_id, Some(note.id));

    store.delete_notebook(work.id).unwrap();
    assert_eq!(store.state().current_notebook_id, None);
    assert_eq!(store.state().current_item_id, None);
}

#[test]
fn delete_other_notebook_keeps_cursors() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let home = store.create_notebook("Home", None, None).unwrap();
    store.set_current_notebook(Some(work.id)).unwrap();
    let note = store.create_note(work.id, "Standup").unwrap();

    store.delete_notebook(home.id).unwrap();
    assert_eq!(store.state().current_notebook_id, Some(work.id));
    assert_eq!(store.state().current_item_id, Some(note.id));
}

#[test]
fn set_current_notebook_resets_current_item() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let home = store.create_notebook("Home", None, None).unwrap();
    store.create_note(work.id, "Standup").unwrap();

    store.set_current_notebook(Some(home.id)).unwrap();
    assert_eq!(store.state().current_notebook_id, Some(home.id));
    assert!(store.current_item().is_none());

    store.set_current_notebook(None).unwrap();
    assert!(store.current_notebook().is_none());

    let err = store.set_current_notebook(Some(Uuid::new_v4())).unwrap_err();
    assert!(matches!(err, StoreError::NotebookNotFound(_)));
}

#[test]
fn create_note_in_unknown_notebook_leaves_state_untouched() {
    let mut store = setup();
    store.create_notebook("Work", None, None).unwrap();
    let before = store.state().clone();

    let err = store.create_note(Uuid::new_v4(), "Orphan").unwrap_err();
    assert!(matches!(err, StoreError::NotebookNotFound(_)));
    assert_eq!(store.state(), &before);
}

#[test]
fn delete_item_clears_item_cursor_only_for_that_item() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let first = store.create_note(work.id, "First").unwrap();
    let second = store.create_note(work.id, "Second").unwrap();

    store.delete_item(first.id).unwrap();
    assert_eq!(store.state().current_item_id, Some(second.id));

    store.delete_item(second.id).unwrap();
    assert_eq!(store.state().current_item_id, None);
    assert!(store.find_notebook(work.id).unwrap().items.is_empty());

    let err = store.delete_item(second.id).unwrap_err();
    assert!(matches!(err, StoreError::ItemNotFound(id) if id == second.id));
}

#[test]
fn set_current_item_keeps_notebook_cursor() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let home = store.create_notebook("Home", None, None).unwrap();
    let note = store.create_note(work.id, "Standup").unwrap();
    store.set_current_notebook(Some(home.id)).unwrap();

    store.set_current_item(Some(note.id)).unwrap();
    assert_eq!(store.state().current_notebook_id, Some(home.id));
    assert_eq!(store.current_item().unwrap().id, note.id);

    store.set_current_item(None).unwrap();
    assert!(store.current_item().is_none());
}

#[test]
fn update_item_rename_reaches_payload() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let note = store.create_note(work.id, "Draft").unwrap();
    let table = store.create_table(work.id, "Tasks", Vec::new()).unwrap();

    store.update_item(note.id, ItemPatch::rename("Final")).unwrap();
    store.update_item(table.id, ItemPatch::rename("Backlog")).unwrap();

    let note_item = store.find_item(note.id).unwrap();
    assert_eq!(note_item.name, "Final");
    assert_eq!(note_item.as_note().unwrap().title, "Final");

    let table_item = store.find_item(table.id).unwrap();
    assert_eq!(table_item.name, "Backlog");
    assert_eq!(table_item.as_table().unwrap().name, "Backlog");
}

#[test]
fn update_note_content_addresses_note_payload_id() {
    let mut store = setup();
    let work = store.create_notebook("Work", None, None).unwrap();
    let item = store.create_note(work.id, "Standup").unwrap();
    let note_id = item.data_id();

    let err = store.update_note_content(item.id, "wrong id").unwrap_err();
    assert!(matches!(err, StoreError::NoteNotFound(_)));

    store
        .update_note_content(note_id, r#"{"type":"doc","content":[]}"#)
        .unwrap();
    let updated = store.find_item(item.id).unwrap();
    let note = updated.as_note().unwrap();
    assert_eq!(note.content, r#"{"type":"doc","content":[]}"#);
    assert!(note.updated_at >= item.updated_at);
    assert_eq!(updated.updated_at, note.updated_at);
    assert_eq!(store.find_notebook(work.id).unwrap().updated_at, note.updated_at);
}

#[test]
fn strict_policy_rejects_blank_names_permissive_accepts_them() {
    let mut strict = setup();
    let err = strict.create_notebook("   ", None, None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BlankName(_))
    ));
    assert!(strict.state().notebooks.is_empty());

    let mut permissive =
        AppStore::open(MemoryStateRepository::new(), ValidationPolicy::Permissive).unwrap();
    let notebook = permissive.create_notebook("", None, None).unwrap();
    permissive.create_note(notebook.id, "").unwrap();
    assert_eq!(permissive.state().item_count(), 1);
}

#[test]
fn subscribers_are_notified_per_successful_mutation() {
    let mut store = setup();
    let calls = Rc::new(Cell::new(0usize));
    let seen_notebooks = Rc::new(Cell::new(0usize));
    let id = {
        let calls = Rc::clone(&calls);
        let seen_notebooks = Rc::clone(&seen_notebooks);
        store.subscribe(move |state| {
            calls.set(calls.get() + 1);
            seen_notebooks.set(state.notebooks.len());
        })
    };

    let work = store.create_notebook("Work", None, None).unwrap();
    store.create_note(work.id, "Standup").unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(seen_notebooks.get(), 1);

    store.delete_notebook(Uuid::new_v4()).unwrap_err();
    assert_eq!(calls.get(), 2);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.set_search_query("meet");
    assert_eq!(calls.get(), 2);
    assert_eq!(store.state().search_query, "meet");
}

#[test]
fn notebook_patch_can_clear_optional_fields() {
    let mut store = setup();
    let notebook = store
        .create_notebook("Work", Some("briefcase".to_string()), Some("blue".to_string()))
        .unwrap();

    store
        .update_notebook(
            notebook.id,
            NotebookPatch {
                icon: Some(None),
                ..NotebookPatch::default()
            },
        )
        .unwrap();

    let updated = store.find_notebook(notebook.id).unwrap();
    assert_eq!(updated.name, "Work");
    assert!(updated.icon.is_none());
    assert_eq!(updated.color.as_deref(), Some("blue"));
}

#[test]
fn from_config_takes_validation_policy_from_config() {
    let config = CoreConfig::from_toml_str("validation = \"permissive\"").unwrap();
    let mut store = AppStore::from_config(MemoryStateRepository::new(), &config).unwrap();
    assert_eq!(store.policy(), ValidationPolicy::Permissive);
    store.create_notebook("  ", None, None).unwrap();

    let strict = AppStore::from_config(MemoryStateRepository::new(), &CoreConfig::default())
        .unwrap();
    assert_eq!(strict.policy(), ValidationPolicy::Strict);
}
