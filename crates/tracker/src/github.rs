//! GitHub Projects (v2) GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use sprintdigest_core::{IterationDef, WorkItem};
use tracing::{debug, info};

use crate::queries;
use crate::response::{GraphQlResponse, NodeData, ProjectFields, ProjectItems};
use crate::source::{FetchError, ProjectSource, Result};

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Connection settings for the GraphQL client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Bearer token
    pub token: String,

    /// Node id of the ProjectV2
    pub project_id: String,

    /// Request timeout
    pub timeout: Duration,
}

impl GithubConfig {
    /// Settings for the public endpoint with a 30 second timeout.
    pub fn new(token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_GRAPHQL_URL.to_string(),
            token: token.into(),
            project_id: project_id.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Project source backed by the GitHub GraphQL API.
#[derive(Clone)]
pub struct GithubProjectClient {
    /// HTTP client
    client: Client,

    /// Connection settings
    config: GithubConfig,
}

impl GithubProjectClient {
    /// Create a client.
    pub fn new(config: GithubConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("sprintdigest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Post a query scoped to the configured project and decode its data.
    async fn query<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let payload = json!({
            "query": query,
            "variables": { "projectId": self.config.project_id },
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Raw GraphQL response ({}): {}", status, body);

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(FetchError::GraphQl(messages.join("; ")));
        }

        parsed
            .data
            .ok_or_else(|| FetchError::Malformed("response carries no data".to_string()))
    }
}

#[async_trait]
impl ProjectSource for GithubProjectClient {
    async fn fetch_iterations(&self) -> Result<Vec<IterationDef>> {
        let data: NodeData<ProjectFields> = self.query(queries::ITERATIONS).await?;
        let project = data.node.ok_or_else(|| {
            FetchError::Malformed(format!("project {} not found", self.config.project_id))
        })?;

        let iterations = project.into_iterations();
        info!("Fetched {} iterations", iterations.len());
        Ok(iterations)
    }

    async fn fetch_items(&self) -> Result<Vec<WorkItem>> {
        let data: NodeData<ProjectItems> = self.query(queries::ITEMS).await?;
        let project = data.node.ok_or_else(|| {
            FetchError::Malformed(format!("project {} not found", self.config.project_id))
        })?;

        let items = project.into_work_items();
        info!("Fetched {} work items", items.len());
        Ok(items)
    }
}
