//! Structured table models: schema, records and saved views.
//!
//! # Responsibility
//! - Define user-defined columns (`PropertyDefinition`) and rows (`TableRecord`).
//! - Model saved view configuration for display layers.
//!
//! # Invariants
//! - Property definition ids are unique within one table.
//! - A record holds at most one `PropertyValue` per `property_id`.
//! - View sort/filter/group settings are stored verbatim; core never applies them.

use crate::model::notebook::NotebookId;
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Stable identifier of a table payload.
pub type TableId = Uuid;
/// Stable identifier of a table record.
pub type RecordId = Uuid;
/// Identifier of a property definition, unique within its table.
pub type PropertyId = Uuid;
/// Stable identifier of a saved table view.
pub type ViewId = Uuid;

/// Name of the view seeded into every new table.
pub const DEFAULT_VIEW_NAME: &str = "All Records";

/// Column type of a property definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Text,
    Number,
    Select,
    Multiselect,
    Date,
    Checkbox,
    Url,
    Email,
    File,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::File => "file",
        }
    }

    /// Value used to seed an empty cell of this type.
    pub fn default_value(self) -> Value {
        match self {
            Self::Checkbox => Value::Bool(false),
            Self::Number => Value::from(0),
            Self::Multiselect => Value::Array(Vec::new()),
            Self::Text
            | Self::Select
            | Self::Date
            | Self::Url
            | Self::Email
            | Self::File => Value::String(String::new()),
        }
    }

    /// Whether `options` constrains the value domain of this type.
    pub fn uses_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

/// Named, typed column in a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub id: PropertyId,
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Value domain for select/multiselect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl PropertyDefinition {
    /// Creates a definition with a fresh id and no options.
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            property_type,
            options: None,
            required: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// One cell: binds a record to one property definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    pub property_id: PropertyId,
    /// Untyped; its expected shape follows the definition's `PropertyType`.
    #[serde(default)]
    pub value: Value,
}

impl PropertyValue {
    pub fn new(property_id: PropertyId, value: impl Into<Value>) -> Self {
        Self {
            property_id,
            value: value.into(),
        }
    }
}

/// Row in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    pub id: RecordId,
    pub table_id: TableId,
    #[serde(default)]
    pub properties: Vec<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TableRecord {
    pub fn new(table_id: TableId, properties: Vec<PropertyValue>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            table_id,
            properties,
            notes: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the cell bound to `property_id`, if any.
    pub fn value_of(&self, property_id: PropertyId) -> Option<&Value> {
        self.properties
            .iter()
            .find(|cell| cell.property_id == property_id)
            .map(|cell| &cell.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Table,
    Card,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub property_id: PropertyId,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub property_id: PropertyId,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    pub property_id: PropertyId,
}

/// Saved display configuration for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: ViewId,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_properties: Option<Vec<PropertyId>>,
}

impl TableView {
    pub fn new(name: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            view_type,
            sort: None,
            filters: None,
            group_by: None,
            visible_properties: None,
        }
    }
}

/// Structured table payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub notebook_id: NotebookId,
    pub name: String,
    #[serde(default)]
    pub property_definitions: Vec<PropertyDefinition>,
    #[serde(default)]
    pub records: Vec<TableRecord>,
    #[serde(default)]
    pub views: Vec<TableView>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Table {
    /// Creates a table with no records and the default "All Records" view.
    pub fn new(
        notebook_id: NotebookId,
        name: impl Into<String>,
        property_definitions: Vec<PropertyDefinition>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            notebook_id,
            name: name.into(),
            property_definitions,
            records: Vec::new(),
            views: vec![TableView::new(DEFAULT_VIEW_NAME, ViewType::Table)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn definition(&self, property_id: PropertyId) -> Option<&PropertyDefinition> {
        self.property_definitions
            .iter()
            .find(|definition| definition.id == property_id)
    }

    pub fn record(&self, record_id: RecordId) -> Option<&TableRecord> {
        self.records.iter().find(|record| record.id == record_id)
    }
}
