//! Project source trait abstraction.

use async_trait::async_trait;
use sprintdigest_core::{IterationDef, WorkItem};

/// Error type for project source operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while fetching project data. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("query endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The endpoint answered with GraphQL errors
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Response did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Source of iterations and work items for one project.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch the iteration definitions configured on the project.
    async fn fetch_iterations(&self) -> Result<Vec<IterationDef>>;

    /// Fetch the project's work items.
    async fn fetch_items(&self) -> Result<Vec<WorkItem>>;
}
