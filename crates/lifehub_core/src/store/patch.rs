//! Partial-update payloads for store operations.
//!
//! `None` leaves a field unchanged. For optional fields the inner `Option`
//! is the new value, so `Some(None)` clears it.

use crate::model::notebook::Notebook;
use crate::model::table::{PropertyDefinition, PropertyType};

/// Partial update for notebook metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookPatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
}

impl NotebookPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, notebook: &mut Notebook) {
        if let Some(name) = self.name {
            notebook.name = name;
        }
        if let Some(icon) = self.icon {
            notebook.icon = icon;
        }
        if let Some(color) = self.color {
            notebook.color = color;
        }
    }
}

/// Partial update for item wrapper metadata.
///
/// A new `name` is mirrored into the note title / table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
}

impl ItemPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Partial update for one property definition. The id is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDefinitionPatch {
    pub name: Option<String>,
    pub property_type: Option<PropertyType>,
    pub options: Option<Option<Vec<String>>>,
    pub required: Option<Option<bool>>,
}

impl PropertyDefinitionPatch {
    pub(crate) fn apply_to(self, definition: &mut PropertyDefinition) {
        if let Some(name) = self.name {
            definition.name = name;
        }
        if let Some(property_type) = self.property_type {
            definition.property_type = property_type;
        }
        if let Some(options) = self.options {
            definition.options = options;
        }
        if let Some(required) = self.required {
            definition.required = required;
        }
    }
}
