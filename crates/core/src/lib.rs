//! SprintDigest core data models.
//!
//! This crate defines the data that flows through a digest run: iteration
//! definitions, work items with their heterogeneous field values, status
//! buckets and the per-assignee digests built from them.

#![warn(missing_docs)]

// Core identities
mod id;

// Upstream records
mod iteration;
mod field;
mod item;

// Grouped output
mod bucket;
mod digest;

// Re-exports
pub use id::*;

pub use iteration::IterationDef;
pub use field::{extract, FieldValue};
pub use item::WorkItem;
pub use bucket::Bucket;
pub use digest::{AssigneeDigest, DigestTask, TaskBuckets};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
