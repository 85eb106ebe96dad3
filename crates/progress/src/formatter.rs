//! Digest rendering: the JSON document, email bodies and console summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprintdigest_core::{AssigneeDigest, Bucket, DigestTask};

/// A task entry in the digest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTitle {
    /// Issue title
    pub title: String,
}

/// Task titles of one assignee, keyed by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTitles {
    /// Not started
    #[serde(rename = "todo", default)]
    pub todo: Vec<TaskTitle>,

    /// In progress
    #[serde(rename = "in-progress", default)]
    pub in_progress: Vec<TaskTitle>,

    /// Under review
    #[serde(rename = "Under-Review", default)]
    pub under_review: Vec<TaskTitle>,
}

impl TaskTitles {
    /// Titles in a bucket.
    pub fn get(&self, bucket: Bucket) -> &[TaskTitle] {
        match bucket {
            Bucket::Todo => &self.todo,
            Bucket::InProgress => &self.in_progress,
            Bucket::UnderReview => &self.under_review,
        }
    }
}

impl From<&AssigneeDigest> for TaskTitles {
    fn from(digest: &AssigneeDigest) -> Self {
        fn titles(tasks: &[DigestTask]) -> Vec<TaskTitle> {
            tasks
                .iter()
                .map(|task| TaskTitle { title: task.title.clone() })
                .collect()
        }

        Self {
            todo: titles(&digest.tasks.todo),
            in_progress: titles(&digest.tasks.in_progress),
            under_review: titles(&digest.tasks.under_review),
        }
    }
}

/// One assignee's entry in the digest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeProgress {
    /// Assignee login
    pub assignee: String,

    /// Titles by bucket
    pub tasks: TaskTitles,
}

/// The transport-ready digest of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestDocument {
    /// Run date, serialised as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// One entry per assignee
    pub assignees_task_progress: Vec<AssigneeProgress>,
}

impl DigestDocument {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document back from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Build the digest document for a run date.
pub fn format_document(digests: &[AssigneeDigest], date: NaiveDate) -> DigestDocument {
    DigestDocument {
        date,
        assignees_task_progress: digests
            .iter()
            .map(|digest| AssigneeProgress {
                assignee: digest.assignee.clone(),
                tasks: TaskTitles::from(digest),
            })
            .collect(),
    }
}

/// Plain-text email body for one assignee.
///
/// Every bucket gets a section, in fixed order, even when it is empty.
pub fn format_email_body(assignee: &str, tasks: &TaskTitles, date: NaiveDate) -> String {
    let mut body = format!(
        "Hello {},\n\nHere is your task progress update for {}:\n\n",
        assignee,
        date.format("%Y-%m-%d")
    );

    for bucket in Bucket::ALL {
        body.push_str(bucket.heading());
        body.push_str(":\n");
        for task in tasks.get(bucket) {
            body.push_str("- ");
            body.push_str(&task.title);
            body.push('\n');
        }
        body.push('\n');
    }

    body
}

/// Console summary of classified digests.
pub fn render_summary(digests: &[AssigneeDigest]) -> String {
    let mut out = String::new();

    for digest in digests {
        out.push_str(&format!("{}:\n", digest.assignee));
        for (i, bucket) in Bucket::ALL.into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("{}:\n", bucket.status_label()));
            for task in digest.tasks.get(bucket) {
                out.push_str(&format!(
                    "  - {} (Iteration ID: {})\n",
                    task.title, task.iteration_id
                ));
            }
        }
        out.push_str(&format!("\n{}\n\n", "-".repeat(20)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sprintdigest_core::IterationId;

    fn task(title: &str) -> DigestTask {
        DigestTask {
            title: title.to_string(),
            iteration_id: IterationId::new("CUR"),
        }
    }

    fn sample() -> Vec<AssigneeDigest> {
        let mut alice = AssigneeDigest::new("alice");
        alice.tasks.push(Bucket::Todo, task("Plan"));
        alice.tasks.push(Bucket::InProgress, task("Build"));
        alice.tasks.push(Bucket::InProgress, task("Test"));

        let mut bob = AssigneeDigest::new("bob");
        bob.tasks.push(Bucket::UnderReview, task("Docs"));

        vec![alice, bob]
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_document_shape() {
        let doc = format_document(&sample(), date());
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["date"], "2024-01-10");
        let alice = &value["assignees_task_progress"][0];
        assert_eq!(alice["assignee"], "alice");
        assert_eq!(alice["tasks"]["todo"][0]["title"], "Plan");
        assert_eq!(alice["tasks"]["in-progress"][1]["title"], "Test");
        assert_eq!(alice["tasks"]["Under-Review"], serde_json::json!([]));
        assert_eq!(
            value["assignees_task_progress"][1]["tasks"]["Under-Review"][0]["title"],
            "Docs"
        );
    }

    #[test]
    fn test_document_round_trip_preserves_order() {
        let doc = format_document(&sample(), date());
        let parsed = DigestDocument::from_json(&doc.to_json().unwrap()).unwrap();

        assert_eq!(parsed, doc);
        let names: Vec<_> = parsed
            .assignees_task_progress
            .iter()
            .map(|p| p.assignee.as_str())
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_email_body() {
        let digests = sample();
        let body = format_email_body("alice", &TaskTitles::from(&digests[0]), date());

        assert_eq!(
            body,
            "Hello alice,\n\n\
             Here is your task progress update for 2024-01-10:\n\n\
             Todo:\n- Plan\n\n\
             In-progress:\n- Build\n- Test\n\n\
             Under-Review:\n\n"
        );
    }

    #[test]
    fn test_summary_lists_iteration_ids() {
        let summary = render_summary(&sample()[1..]);
        assert!(summary.starts_with("bob:\nSpring Todo:\n\nIn Progress:\n\nUnder Review:\n"));
        assert!(summary.contains("  - Docs (Iteration ID: CUR)\n"));
        assert!(summary.contains("--------------------"));
    }
}
