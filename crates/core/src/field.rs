//! Project field values and the field extractor.
//!
//! A project item carries a list of field values of different kinds. The
//! extractor looks a field up by name and returns its scalar as a string,
//! whatever kind it is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One field value on a project item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free-text field
    Text {
        /// Field name
        field: String,
        /// Text content
        text: String,
    },

    /// Single-select field, carries the selected option's display name
    SingleSelect {
        /// Field name
        field: String,
        /// Selected option name
        name: String,
    },

    /// Date field
    Date {
        /// Field name
        field: String,
        /// Date value
        date: NaiveDate,
    },

    /// Iteration field, carries the referenced iteration's id
    Iteration {
        /// Field name
        field: String,
        /// Referenced iteration id
        iteration_id: String,
    },
}

impl FieldValue {
    /// Text value constructor.
    pub fn text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text { field: field.into(), text: text.into() }
    }

    /// Single-select value constructor.
    pub fn single_select(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::SingleSelect { field: field.into(), name: name.into() }
    }

    /// Date value constructor.
    pub fn date(field: impl Into<String>, date: NaiveDate) -> Self {
        Self::Date { field: field.into(), date }
    }

    /// Iteration value constructor.
    pub fn iteration(field: impl Into<String>, iteration_id: impl Into<String>) -> Self {
        Self::Iteration { field: field.into(), iteration_id: iteration_id.into() }
    }

    /// Name of the field this value belongs to.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Text { field, .. }
            | Self::SingleSelect { field, .. }
            | Self::Date { field, .. }
            | Self::Iteration { field, .. } => field,
        }
    }

    /// Scalar value rendered as a string. Dates use `YYYY-MM-DD`.
    pub fn scalar(&self) -> String {
        match self {
            Self::Text { text, .. } => text.clone(),
            Self::SingleSelect { name, .. } => name.clone(),
            Self::Date { date, .. } => date.format("%Y-%m-%d").to_string(),
            Self::Iteration { iteration_id, .. } => iteration_id.clone(),
        }
    }
}

/// Extract the value of `field_name` from a list of field values.
///
/// The first entry with a matching field name wins. An empty string means
/// the field is absent on this item.
pub fn extract(field_values: &[FieldValue], field_name: &str) -> String {
    field_values
        .iter()
        .find(|value| value.field_name() == field_name)
        .map(FieldValue::scalar)
        .unwrap_or_default()
}
