//! Wire shapes of the Projects API responses and their conversion into the
//! core model.

use chrono::NaiveDate;
use serde::Deserialize;
use sprintdigest_core::{FieldValue, IterationDef, WorkItem};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeData<N> {
    pub node: Option<N>,
}

/// GitHub connections may contain null entries.
#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

// === Iterations ===

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectFields {
    pub fields: Option<Connection<FieldNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldNode {
    pub name: Option<String>,
    pub configuration: Option<IterationConfiguration>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IterationConfiguration {
    #[serde(default)]
    pub iterations: Vec<RawIteration>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIteration {
    pub id: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    pub title: Option<String>,
}

impl ProjectFields {
    /// Iterations of every iteration field, in response order.
    pub fn into_iterations(self) -> Vec<IterationDef> {
        let Some(fields) = self.fields else {
            return Vec::new();
        };

        let mut iterations = Vec::new();
        for field in fields.into_nodes() {
            let Some(configuration) = field.configuration else {
                continue;
            };
            debug!(
                "Iteration field {} has {} iterations",
                field.name.as_deref().unwrap_or("<unnamed>"),
                configuration.iterations.len()
            );
            for raw in configuration.iterations {
                let mut def = IterationDef::new(raw.id, raw.start_date);
                def.title = raw.title;
                iterations.push(def);
            }
        }
        iterations
    }
}

// === Items ===

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectItems {
    pub items: Option<Connection<RawItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawItem {
    pub id: String,
    #[serde(rename = "fieldValues")]
    pub field_values: Option<Connection<RawFieldValue>>,
    pub content: Option<RawContent>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FieldRef {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum RawFieldValue {
    #[serde(rename = "ProjectV2ItemFieldTextValue")]
    Text {
        text: Option<String>,
        field: Option<FieldRef>,
    },
    #[serde(rename = "ProjectV2ItemFieldSingleSelectValue")]
    SingleSelect {
        name: Option<String>,
        field: Option<FieldRef>,
    },
    #[serde(rename = "ProjectV2ItemFieldDateValue")]
    Date {
        date: Option<NaiveDate>,
        field: Option<FieldRef>,
    },
    #[serde(rename = "ProjectV2ItemFieldIterationValue")]
    Iteration {
        #[serde(rename = "iterationId")]
        iteration_id: Option<String>,
        field: Option<FieldRef>,
    },
    #[serde(other)]
    Unsupported,
}

impl RawFieldValue {
    /// Convert into a field value; kinds the digest does not read, and
    /// values without a field name or scalar, yield `None`.
    fn into_field_value(self) -> Option<FieldValue> {
        fn field_name(field: Option<FieldRef>) -> Option<String> {
            field.and_then(|f| f.name)
        }

        match self {
            Self::Text { text, field } => Some(FieldValue::text(field_name(field)?, text?)),
            Self::SingleSelect { name, field } => {
                Some(FieldValue::single_select(field_name(field)?, name?))
            }
            Self::Date { date, field } => Some(FieldValue::date(field_name(field)?, date?)),
            Self::Iteration { iteration_id, field } => {
                Some(FieldValue::iteration(field_name(field)?, iteration_id?))
            }
            Self::Unsupported => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum RawContent {
    Issue {
        #[serde(default)]
        title: Option<String>,
        assignees: Option<Connection<Login>>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Login {
    pub login: String,
}

impl RawItem {
    fn into_work_item(self) -> WorkItem {
        let (title, assignees) = match self.content {
            Some(RawContent::Issue { title, assignees }) => (
                title.unwrap_or_default(),
                assignees
                    .map(|c| c.into_nodes().map(|l| l.login).collect())
                    .unwrap_or_default(),
            ),
            Some(RawContent::Other) | None => (String::new(), Vec::new()),
        };

        let field_values = self
            .field_values
            .map(|c| c.into_nodes().filter_map(RawFieldValue::into_field_value).collect())
            .unwrap_or_default();

        let mut item = WorkItem::new(self.id, title);
        item.assignees = assignees;
        item.field_values = field_values;
        item
    }
}

impl ProjectItems {
    /// Work items in response order.
    pub fn into_work_items(self) -> Vec<WorkItem> {
        self.items
            .map(|c| c.into_nodes().map(RawItem::into_work_item).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_item_with_mixed_field_values() {
        let raw = json!({
            "items": { "nodes": [{
                "id": "PVTI_1",
                "fieldValues": { "nodes": [
                    { "__typename": "ProjectV2ItemFieldRepositoryValue" },
                    { "__typename": "ProjectV2ItemFieldTextValue", "text": "Fix login", "field": { "name": "Title" } },
                    { "__typename": "ProjectV2ItemFieldSingleSelectValue", "name": "In Progress", "field": { "name": "Status" } },
                    { "__typename": "ProjectV2ItemFieldDateValue", "date": "2024-01-12", "field": { "name": "Due" } },
                    { "__typename": "ProjectV2ItemFieldIterationValue", "iterationId": "it-1", "field": { "name": "DT24-" } },
                    null
                ]},
                "content": {
                    "__typename": "Issue",
                    "id": "I_1",
                    "title": "Fix login",
                    "state": "OPEN",
                    "assignees": { "nodes": [{ "login": "alice" }, { "login": "bob" }] }
                }
            }]}
        });

        let items: ProjectItems = serde_json::from_value(raw).unwrap();
        let items = items.into_work_items();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Fix login");
        assert_eq!(item.assignee(), Some("alice"));
        assert_eq!(item.field_values.len(), 4);
        assert_eq!(item.field("Status"), "In Progress");
        assert_eq!(item.field("Due"), "2024-01-12");
        assert_eq!(item.field("DT24-"), "it-1");
    }

    #[test]
    fn test_parse_item_without_issue_content() {
        let raw = json!({
            "items": { "nodes": [
                { "id": "PVTI_2", "fieldValues": { "nodes": [] }, "content": null },
                { "id": "PVTI_3", "fieldValues": { "nodes": [] }, "content": { "__typename": "DraftIssue" } }
            ]}
        });

        let items: ProjectItems = serde_json::from_value(raw).unwrap();
        let items = items.into_work_items();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.assignees.is_empty() && i.title.is_empty()));
    }

    #[test]
    fn test_parse_iterations_skips_other_fields() {
        let raw = json!({
            "fields": { "nodes": [
                {},
                { "id": "F1", "name": "DT24-", "configuration": { "iterations": [
                    { "startDate": "2024-01-01", "id": "it-1", "title": "Sprint 1" },
                    { "startDate": "2024-01-15", "id": "it-2", "title": "Sprint 2" }
                ]}}
            ]}
        });

        let fields: ProjectFields = serde_json::from_value(raw).unwrap();
        let iterations = fields.into_iterations();

        assert_eq!(iterations.len(), 2);
        assert_eq!(iterations[0].id.as_str(), "it-1");
        assert_eq!(iterations[1].start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(iterations[1].title.as_deref(), Some("Sprint 2"));
    }
}
