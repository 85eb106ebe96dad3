//! Iteration model - fixed-length planning windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::id::IterationId;

/// An iteration as configured on the project's iteration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationDef {
    /// Unique identifier
    pub id: IterationId,

    /// First day of the iteration
    pub start_date: NaiveDate,

    /// Display title, when the API returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl IterationDef {
    /// Create an iteration definition without a title.
    pub fn new(id: impl Into<IterationId>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            title: None,
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
