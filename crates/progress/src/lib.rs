//! Iteration progress (digest logic)
//!
//! Current-iteration resolution, task classification by assignee and
//! status, and digest rendering.

#![warn(missing_docs)]

pub mod resolver;
pub mod classifier;
pub mod formatter;

pub use resolver::{resolve_current, IterationResolver, IterationWindow, DEFAULT_ITERATION_DAYS};
pub use classifier::{classify, Classification, ClassificationStats, ClassifierConfig, TaskClassifier};
pub use formatter::{
    format_document, format_email_body, render_summary, AssigneeProgress, DigestDocument,
    TaskTitle, TaskTitles,
};
