//! GraphQL documents sent to the Projects API.

/// Iteration field configuration of a project.
pub(crate) const ITERATIONS: &str = r#"
query($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 20) {
        nodes {
          ... on ProjectV2IterationField {
            id
            name
            configuration {
              iterations {
                startDate
                id
                title
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// The last 100 project items with their field values and issue content.
pub(crate) const ITEMS: &str = r#"
query($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      items(last: 100) {
        nodes {
          id
          fieldValues(first: 8) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldTextValue {
                text
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldDateValue {
                date
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldIterationValue {
                iterationId
                field { ... on ProjectV2FieldCommon { name } }
              }
            }
          }
          content {
            __typename
            ... on Issue {
              id
              title
              state
              assignees(first: 10) {
                nodes { login }
              }
            }
          }
        }
      }
    }
  }
}
"#;
