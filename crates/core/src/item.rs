//! Work item model - a project item as seen by the digest.

use serde::{Deserialize, Serialize};
use crate::field::{extract, FieldValue};
use crate::id::ItemId;

/// A project item with its issue content flattened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Project item id
    pub id: ItemId,

    /// Issue title
    pub title: String,

    /// Assignee logins, in API order
    pub assignees: Vec<String>,

    /// Field values attached to the item
    pub field_values: Vec<FieldValue>,
}

impl WorkItem {
    /// Create an item with no assignees and no field values.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            title: title.into(),
            assignees: Vec::new(),
            field_values: Vec::new(),
        }
    }

    /// Add an assignee.
    pub fn with_assignee(mut self, login: impl Into<String>) -> Self {
        self.assignees.push(login.into());
        self
    }

    /// Add a field value.
    pub fn with_field(mut self, value: FieldValue) -> Self {
        self.field_values.push(value);
        self
    }

    /// The assignee the digest is attributed to: the first one listed.
    pub fn assignee(&self) -> Option<&str> {
        self.assignees.first().map(String::as_str)
    }

    /// Value of a named field, empty when absent.
    pub fn field(&self, field_name: &str) -> String {
        extract(&self.field_values, field_name)
    }
}
