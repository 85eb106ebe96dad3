//! Project tracker access.
//!
//! This crate provides the [`ProjectSource`] interface used by a digest run
//! and a GitHub Projects (v2) GraphQL implementation.

#![warn(missing_docs)]

pub mod source;
pub mod github;
mod queries;
mod response;

pub use source::{FetchError, ProjectSource, Result};
pub use github::{GithubConfig, GithubProjectClient, DEFAULT_GRAPHQL_URL};
