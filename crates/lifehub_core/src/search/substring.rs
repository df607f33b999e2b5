//! Case-insensitive substring search over an `AppState`.
//!
//! # Responsibility
//! - Find items whose name, note fields or table cells contain a query.
//! - Yield results lazily in notebook-then-item order.
//!
//! # Invariants
//! - Blank queries match nothing.
//! - Each item is yielded at most once, whichever field matched first.
//! - Search never mutates state.

use crate::model::notebook::{ItemData, Notebook, NotebookItem};
use crate::model::state::AppState;
use serde_json::Value;
use std::slice;

/// Lazy iterator over items matching one query.
///
/// Created by [`matching_items`].
pub struct MatchingItems<'a> {
    needle: Option<String>,
    notebooks: slice::Iter<'a, Notebook>,
    items: slice::Iter<'a, NotebookItem>,
}

impl<'a> Iterator for MatchingItems<'a> {
    type Item = &'a NotebookItem;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_deref()?;
        loop {
            for item in self.items.by_ref() {
                if item_matches(item, needle) {
                    return Some(item);
                }
            }
            self.items = self.notebooks.next()?.items.iter();
        }
    }
}

/// Returns a lazy iterator over items matching `query`.
pub fn matching_items<'a>(state: &'a AppState, query: &str) -> MatchingItems<'a> {
    MatchingItems {
        needle: normalize_query(query),
        notebooks: state.notebooks.iter(),
        items: Default::default(),
    }
}

/// Searches all items and returns matches in traversal order.
///
/// Returns an empty list for blank queries. No ranking or pagination.
pub fn search_items<'a>(state: &'a AppState, query: &str) -> Vec<&'a NotebookItem> {
    matching_items(state, query).collect()
}

/// Text form of a cell value used for matching and display.
///
/// Strings are returned as-is, arrays join their elements with `,`, `null`
/// becomes the empty string and objects are rendered as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(entries) => entries
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        return None;
    }
    Some(query.to_lowercase())
}

fn item_matches(item: &NotebookItem, needle: &str) -> bool {
    if contains_folded(&item.name, needle) {
        return true;
    }

    match &item.data {
        ItemData::Note(note) => {
            contains_folded(&note.title, needle)
                || contains_folded(&note.content, needle)
                || note.tags.iter().any(|tag| contains_folded(tag, needle))
        }
        ItemData::Table(table) => table.records.iter().any(|record| {
            record
                .properties
                .iter()
                .any(|cell| contains_folded(&value_text(&cell.value), needle))
        }),
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
