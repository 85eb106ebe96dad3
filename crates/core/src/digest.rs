//! Per-assignee digest model.

use serde::{Deserialize, Serialize};
use crate::bucket::Bucket;
use crate::id::IterationId;

/// A task listed in a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestTask {
    /// Issue title
    pub title: String,

    /// Iteration the task belongs to
    pub iteration_id: IterationId,
}

/// Tasks of one assignee, split by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBuckets {
    /// Not started
    pub todo: Vec<DigestTask>,

    /// In progress
    pub in_progress: Vec<DigestTask>,

    /// Under review
    pub under_review: Vec<DigestTask>,
}

impl TaskBuckets {
    /// Tasks in a bucket.
    pub fn get(&self, bucket: Bucket) -> &[DigestTask] {
        match bucket {
            Bucket::Todo => &self.todo,
            Bucket::InProgress => &self.in_progress,
            Bucket::UnderReview => &self.under_review,
        }
    }

    /// Append a task to a bucket.
    pub fn push(&mut self, bucket: Bucket, task: DigestTask) {
        match bucket {
            Bucket::Todo => self.todo.push(task),
            Bucket::InProgress => self.in_progress.push(task),
            Bucket::UnderReview => self.under_review.push(task),
        }
    }

    /// Total number of tasks across buckets.
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.under_review.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The digest of one assignee for the current iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeDigest {
    /// Assignee login
    pub assignee: String,

    /// Tasks by bucket
    pub tasks: TaskBuckets,
}

impl AssigneeDigest {
    /// Create an empty digest.
    pub fn new(assignee: impl Into<String>) -> Self {
        Self {
            assignee: assignee.into(),
            tasks: TaskBuckets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut buckets = TaskBuckets::default();
        assert!(buckets.is_empty());

        buckets.push(Bucket::UnderReview, DigestTask {
            title: "Review API".to_string(),
            iteration_id: IterationId::new("it-1"),
        });

        assert_eq!(buckets.len(), 1);
        assert!(buckets.get(Bucket::Todo).is_empty());
        assert_eq!(buckets.get(Bucket::UnderReview)[0].title, "Review API");
    }
}
