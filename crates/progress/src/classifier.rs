//! Task classification by assignee and status bucket.

use std::collections::HashMap;
use sprintdigest_core::{AssigneeDigest, Bucket, DigestTask, IterationId, WorkItem};
use tracing::{debug, warn};

/// Field names the classifier reads from each item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Single-select field holding the item status
    pub status_field: String,

    /// Iteration field linking the item to an iteration
    pub iteration_field: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            status_field: "Status".to_string(),
            iteration_field: "DT24-".to_string(),
        }
    }
}

/// Counters describing what happened to each input item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    /// Items looked at
    pub considered: usize,

    /// Dropped: no assignee
    pub unassigned: usize,

    /// Dropped: not in the current iteration
    pub other_iteration: usize,

    /// Dropped: status outside the tracked set
    pub unmapped_status: usize,

    /// Added to a bucket
    pub classified: usize,
}

/// Result of a classification pass.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Digests in order of the assignee's first appearance
    pub digests: Vec<AssigneeDigest>,

    /// Per-item outcome counters
    pub stats: ClassificationStats,
}

impl Classification {
    /// Look up the digest of an assignee.
    pub fn get(&self, assignee: &str) -> Option<&AssigneeDigest> {
        self.digests.iter().find(|d| d.assignee == assignee)
    }
}

/// Groups work items of the current iteration by assignee and bucket.
#[derive(Debug, Clone, Default)]
pub struct TaskClassifier {
    config: ClassifierConfig,
}

impl TaskClassifier {
    /// Create a classifier.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify items against the current iteration.
    pub fn classify(&self, items: &[WorkItem], current: &IterationId) -> Classification {
        let mut digests: Vec<AssigneeDigest> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut stats = ClassificationStats::default();

        for item in items {
            stats.considered += 1;

            let Some(assignee) = item.assignee() else {
                debug!("Skipping unassigned item {} ({})", item.id, item.title);
                stats.unassigned += 1;
                continue;
            };
            if item.assignees.len() > 1 {
                debug!(
                    "Item {} has {} assignees; attributing to {}",
                    item.id,
                    item.assignees.len(),
                    assignee
                );
            }

            let iteration_id = item.field(&self.config.iteration_field);
            if current.as_str() != iteration_id {
                debug!(
                    "Skipping item {}: iteration '{}' is not current",
                    item.id, iteration_id
                );
                stats.other_iteration += 1;
                continue;
            }

            let status = item.field(&self.config.status_field);
            debug!(
                "Assignee: {}, Title: {}, Status: {}, Iteration ID: {}",
                assignee, item.title, status, iteration_id
            );

            // The assignee gets a digest even if this item's status is untracked.
            let slot = *index.entry(assignee.to_string()).or_insert_with(|| {
                digests.push(AssigneeDigest::new(assignee));
                digests.len() - 1
            });

            match Bucket::from_status(&status) {
                Some(bucket) => {
                    digests[slot].tasks.push(bucket, DigestTask {
                        title: item.title.clone(),
                        iteration_id: current.clone(),
                    });
                    stats.classified += 1;
                }
                None => {
                    warn!(
                        "Dropping '{}' for {}: status '{}' has no bucket",
                        item.title, assignee, status
                    );
                    stats.unmapped_status += 1;
                }
            }
        }

        Classification { digests, stats }
    }
}

/// Classify with the default field names.
pub fn classify(items: &[WorkItem], current: &IterationId) -> Vec<AssigneeDigest> {
    TaskClassifier::default().classify(items, current).digests
}
