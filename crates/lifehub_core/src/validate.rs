//! Input validation for store mutations.
//!
//! # Responsibility
//! - Define the validation policy switch (`strict` vs `permissive`).
//! - Check names, tags and record cells against the owning table schema.
//!
//! # Invariants
//! - `null` and the type's default value are accepted for every property type.
//! - Validation never mutates its inputs.

use crate::model::table::{PropertyDefinition, PropertyId, PropertyType, PropertyValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// How strictly store mutations check caller input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Reject blank names/tags and cells that do not fit their definition.
    #[default]
    Strict,
    /// Store caller input as given; only structural invariants are enforced.
    Permissive,
}

impl ValidationPolicy {
    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!(
                "unsupported validation policy `{other}`; expected strict|permissive"
            )),
        }
    }
}

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name-like field is blank after trim.
    BlankName(&'static str),
    /// Tag is blank after trim.
    BlankTag,
    /// Cell references a property the table does not define.
    UnknownProperty(PropertyId),
    /// Cell shape does not match the definition type.
    TypeMismatch {
        property_id: PropertyId,
        expected: PropertyType,
    },
    /// Select/multiselect value outside the definition options.
    OptionNotAllowed {
        property_id: PropertyId,
        value: String,
    },
    /// Required property is absent or empty.
    MissingRequired(PropertyId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::BlankTag => write!(f, "tag must not be blank"),
            Self::UnknownProperty(id) => write!(f, "unknown property: {id}"),
            Self::TypeMismatch {
                property_id,
                expected,
            } => write!(
                f,
                "value for property {property_id} is not a valid `{}`",
                expected.as_str()
            ),
            Self::OptionNotAllowed { property_id, value } => {
                write!(f, "`{value}` is not an option of property {property_id}")
            }
            Self::MissingRequired(id) => write!(f, "required property is missing: {id}"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects blank names.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankName(field));
    }
    Ok(())
}

/// Rejects blank tags. Tags are otherwise stored verbatim (case-sensitive).
pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    if tag.trim().is_empty() {
        return Err(ValidationError::BlankTag);
    }
    Ok(())
}

/// Validates a full set of record cells against a table schema.
///
/// Checks, in order: every cell references a known definition and fits its
/// type, then every required definition has a non-empty cell.
pub fn validate_record_values(
    definitions: &[PropertyDefinition],
    values: &[PropertyValue],
) -> Result<(), ValidationError> {
    for cell in values {
        let definition = definitions
            .iter()
            .find(|definition| definition.id == cell.property_id)
            .ok_or(ValidationError::UnknownProperty(cell.property_id))?;
        validate_value(definition, &cell.value)?;
    }

    for definition in definitions.iter().filter(|definition| definition.is_required()) {
        let present = values
            .iter()
            .find(|cell| cell.property_id == definition.id)
            .is_some_and(|cell| !is_empty_value(&cell.value));
        if !present {
            return Err(ValidationError::MissingRequired(definition.id));
        }
    }

    Ok(())
}

/// Validates one cell value against its definition.
pub fn validate_value(definition: &PropertyDefinition, value: &Value) -> Result<(), ValidationError> {
    if value.is_null() || *value == definition.property_type.default_value() {
        return Ok(());
    }

    let mismatch = || ValidationError::TypeMismatch {
        property_id: definition.id,
        expected: definition.property_type,
    };

    match definition.property_type {
        PropertyType::Text | PropertyType::File => {
            value.as_str().ok_or_else(mismatch)?;
        }
        PropertyType::Number => {
            if !value.is_number() {
                return Err(mismatch());
            }
        }
        PropertyType::Checkbox => {
            if !value.is_boolean() {
                return Err(mismatch());
            }
        }
        PropertyType::Date => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if !text.is_empty() && !DATE_RE.is_match(text) {
                return Err(mismatch());
            }
        }
        PropertyType::Url => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if !text.is_empty() && !URL_RE.is_match(text) {
                return Err(mismatch());
            }
        }
        PropertyType::Email => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if !text.is_empty() && !EMAIL_RE.is_match(text) {
                return Err(mismatch());
            }
        }
        PropertyType::Select => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if !text.is_empty() {
                ensure_option(definition, text)?;
            }
        }
        PropertyType::Multiselect => {
            let entries = value.as_array().ok_or_else(mismatch)?;
            for entry in entries {
                let text = entry.as_str().ok_or_else(mismatch)?;
                ensure_option(definition, text)?;
            }
        }
    }

    Ok(())
}

fn ensure_option(definition: &PropertyDefinition, value: &str) -> Result<(), ValidationError> {
    // No options declared means the domain is open.
    let Some(options) = definition.options.as_ref() else {
        return Ok(());
    };
    if options.iter().any(|option| option == value) {
        return Ok(());
    }
    Err(ValidationError::OptionNotAllowed {
        property_id: definition.id,
        value: value.to_string(),
    })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(entries) => entries.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}
