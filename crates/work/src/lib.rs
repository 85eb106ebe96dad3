//! Digest run orchestration.
//!
//! One run fetches iterations, resolves the current one, fetches items,
//! classifies them and hands the digest document to the notifier.

#![warn(missing_docs)]

pub mod run;

pub use run::{
    DigestRun, IterationListing, PreparedDigest, RunConfig, RunError, RunOutcome, RunSummary,
};
